use cfg_if::cfg_if;
use image::RgbaImage;

use crate::error::AppError;

pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl GpuTexture {
    pub fn from_rgba(device: &wgpu::Device, queue: &wgpu::Queue, width: u32, height: u32, rgba: &[u8], label: &str) -> Self {
        let size = wgpu::Extent3d { width, height, depth_or_array_layers: 1 };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }

    /// 1x1 texture of a single colour
    pub fn solid(device: &wgpu::Device, queue: &wgpu::Queue, rgba: [u8; 4], label: &str) -> Self {
        Self::from_rgba(device, queue, 1, 1, &rgba, label)
    }

    pub fn from_image(device: &wgpu::Device, queue: &wgpu::Queue, image: &RgbaImage, label: &str) -> Self {
        Self::from_rgba(device, queue, image.width(), image.height(), image.as_raw(), label)
    }
}

pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage, AppError> {
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

/// Clamp the image so it fits in a texture of at most `max_side` pixels per side
pub fn fit_to_limit(image: RgbaImage, max_side: u32) -> RgbaImage {
    if image.width() <= max_side && image.height() <= max_side {
        return image;
    }
    tracing::debug!(width = image.width(), height = image.height(), max_side, "downscaling texture");
    image::imageops::resize(
        &image,
        image.width().min(max_side),
        image.height().min(max_side),
        image::imageops::FilterType::Triangle,
    )
}

cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        use std::cell::RefCell;
        use std::rc::Rc;

        use wasm_bindgen::JsCast;
        use wasm_bindgen_futures::JsFuture;

        /// Image being fetched in the background; polled once per frame
        pub struct PendingTexture {
            slot: Rc<RefCell<Option<RgbaImage>>>,
        }

        impl PendingTexture {
            pub fn spawn(source: String) -> Self {
                let slot = Rc::new(RefCell::new(None));
                let target = slot.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    match fetch_bytes(&source).await.and_then(|bytes| decode_image(&bytes)) {
                        Ok(image) => {
                            tracing::info!(%source, width = image.width(), height = image.height(), "texture loaded");
                            *target.borrow_mut() = Some(image);
                        }
                        Err(e) => tracing::warn!(%source, "texture unavailable, keeping placeholder: {e}"),
                    }
                });
                Self { slot }
            }

            pub fn poll(&self) -> Option<RgbaImage> {
                self.slot.borrow_mut().take()
            }
        }

        async fn fetch_bytes(url: &str) -> Result<Vec<u8>, AppError> {
            let window = web_sys::window().ok_or_else(|| AppError::Dom("no global `window`".into()))?;
            let response: web_sys::Response = JsFuture::from(window.fetch_with_str(url))
                .await?
                .dyn_into()
                .map_err(|_| AppError::Fetch("fetch did not yield a Response".into()))?;
            if !response.ok() {
                return Err(AppError::Fetch(format!("HTTP {} for {url}", response.status())));
            }
            let buffer = JsFuture::from(response.array_buffer()?).await?;
            Ok(js_sys::Uint8Array::new(&buffer).to_vec())
        }
    } else {
        use std::sync::mpsc::{self, Receiver};

        /// Image being loaded on a background thread; polled once per frame
        pub struct PendingTexture {
            rx: Receiver<RgbaImage>,
        }

        impl PendingTexture {
            pub fn spawn(source: String) -> Self {
                let (tx, rx) = mpsc::channel();
                let spawned = std::thread::Builder::new()
                    .name("texture-loader".into())
                    .spawn(move || match load_bytes(&source).and_then(|bytes| decode_image(&bytes)) {
                        Ok(image) => {
                            tracing::info!(%source, width = image.width(), height = image.height(), "texture loaded");
                            let _ = tx.send(image);
                        }
                        Err(e) => tracing::warn!(%source, "texture unavailable, keeping placeholder: {e}"),
                    });
                if let Err(e) = spawned {
                    tracing::warn!("could not start texture loader: {e}");
                }
                Self { rx }
            }

            pub fn poll(&self) -> Option<RgbaImage> {
                self.rx.try_recv().ok()
            }
        }

        /// `http(s)://` sources are downloaded, anything else is read from disk
        fn load_bytes(source: &str) -> Result<Vec<u8>, AppError> {
            if source.starts_with("http://") || source.starts_with("https://") {
                let mut response = ureq::get(source)
                    .call()
                    .map_err(|e| AppError::Fetch(format!("{source}: {e}")))?;
                response
                    .body_mut()
                    .read_to_vec()
                    .map_err(|e| AppError::Fetch(format!("{source}: {e}")))
            } else {
                Ok(std::fs::read(source)?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn decodes_png() {
        let image = decode_image(&png_bytes(3, 2)).unwrap();
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.get_pixel(2, 1).0, [10, 20, 30, 255]);
    }

    #[test]
    fn garbage_is_an_image_error() {
        let err = decode_image(b"definitely not an image").unwrap_err();
        assert!(matches!(err, AppError::Image(_)));
    }

    #[test]
    fn fit_to_limit_leaves_small_images_alone() {
        let image = RgbaImage::new(64, 32);
        assert_eq!(fit_to_limit(image, 2048).dimensions(), (64, 32));
    }

    #[test]
    fn fit_to_limit_clamps_each_side() {
        let image = RgbaImage::new(300, 100);
        assert_eq!(fit_to_limit(image, 128).dimensions(), (128, 100));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn missing_file_leaves_texture_pending() {
        let pending = PendingTexture::spawn("does/not/exist.png".into());
        std::thread::sleep(std::time::Duration::from_millis(50));
        assert!(pending.poll().is_none());
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn local_file_arrives_through_poll() {
        let path = std::env::temp_dir().join(format!("skyflight-texture-{}.png", std::process::id()));
        std::fs::write(&path, png_bytes(4, 4)).unwrap();

        let pending = PendingTexture::spawn(path.to_string_lossy().into_owned());
        let mut loaded = None;
        for _ in 0..200 {
            loaded = pending.poll();
            if loaded.is_some() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded.map(|i| i.dimensions()), Some((4, 4)));
    }
}
