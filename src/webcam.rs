// thin wrapper around openpnp_capture
use anyhow::{anyhow, Context, Result};
use image::RgbImage;
use openpnp_capture::{Device, Format, Stream};

pub struct Camera {
    stream: Stream,
    width: u32,
    height: u32,
    buffer: Vec<u8>,
}

impl Camera {
    /// Opens camera `index` and requests the given resolution and frame rate.
    ///
    /// The driver may pick a different format; [`Camera::resolution`] reports the one in use.
    pub fn open(index: usize, width: u32, height: u32, fps: u32) -> Result<Self> {
        let devices = Device::enumerate();
        log::info!("There are {} available cameras.", devices.len());

        let id = *devices
            .get(index)
            .with_context(|| format!("no camera with index {}", index))?;
        let device = Device::new(id).with_context(|| format!("failed to open camera {}", index))?;

        let format = Format::default().width(width).height(height).fps(fps);
        let stream = Stream::new(&device, &format)
            .with_context(|| format!("failed to start stream on camera {}", index))?;

        let (width, height) = (stream.format().width, stream.format().height);
        log::info!("Opened camera {} at {}x{}", index, width, height);

        Ok(Self {
            stream,
            width,
            height,
            buffer: Vec::new(),
        })
    }

    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Waits for the next frame and copies it out of the stream.
    pub fn frame(&mut self) -> Result<RgbImage> {
        self.stream.advance();
        self.stream
            .read(&mut self.buffer)
            .map_err(|e| anyhow!("failed to read frame: {:?}", e))?;

        RgbImage::from_raw(self.width, self.height, self.buffer.clone()).with_context(|| {
            format!(
                "frame of {} bytes does not match {}x{}",
                self.buffer.len(),
                self.width,
                self.height
            )
        })
    }
}
