//! Error types for snowfall.
//!
//! The simulation itself never fails: every geometric edge case is clamped.
//! These errors come from the edges of the crate (loading configuration,
//! writing snapshots, bringing up a GPU surface or a window).

use thiserror::Error;

/// Errors that can occur during GPU initialization.
#[derive(Debug, Error)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    #[error("Failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    #[error("No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support.")]
    NoAdapter,
    /// Failed to create GPU device.
    #[error("Failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
    /// The surface reported no usable texture format.
    #[error("GPU surface has no supported texture format")]
    NoSurfaceFormat,
}

/// Errors surfaced by the snowfall crate.
#[derive(Debug, Error)]
pub enum SnowError {
    /// Failed to read or write a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Configuration JSON could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
    /// Snapshot image could not be encoded.
    #[error("Failed to encode snapshot: {0}")]
    Image(#[from] image::ImageError),
    /// GPU initialization failed.
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
    /// Failed to create event loop.
    #[error("Failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    /// Failed to create window.
    #[error("Failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    /// Bad command line usage.
    #[error("{0}")]
    Usage(String),
}
