//! PNG encoding and delivery of captured frames.

use std::io::Cursor;

use anyhow::{Context as _, Result};
use image::{ImageFormat, RgbaImage};

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .context("encoding frame as PNG")?;
    Ok(bytes)
}

/// Write the PNG to `path`, creating its directory if needed.
#[cfg(not(target_arch = "wasm32"))]
pub fn save_png(bytes: &[u8], path: &std::path::Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating export directory {}", dir.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
    log::info!("exported {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

/// Offer the PNG as a browser download through a temporary object URL. The
/// anchor is attached to the body for the click and the URL is revoked on a
/// later tick so the browser has started reading it.
#[cfg(target_arch = "wasm32")]
pub fn download_png(bytes: &[u8], file_name: &str) -> Result<()> {
    use wasm_bindgen::{JsCast, closure::Closure};

    let js_err = |what: &'static str| move |err: wasm_bindgen::JsValue| anyhow::anyhow!("{what}: {err:?}");

    let parts = js_sys::Array::new();
    parts.push(&js_sys::Uint8Array::from(bytes));
    let options = web_sys::BlobPropertyBag::new();
    options.set_type("image/png");
    let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &options)
        .map_err(js_err("creating blob"))?;
    let url = web_sys::Url::create_object_url_with_blob(&blob).map_err(js_err("creating object url"))?;

    let window = web_sys::window().context("no window to download from")?;
    let document = window.document().context("no document to attach the download to")?;
    let body = document.body().context("document has no body")?;
    let anchor = document
        .create_element("a")
        .map_err(js_err("creating anchor"))?
        .dyn_into::<web_sys::HtmlAnchorElement>()
        .map_err(|_| anyhow::anyhow!("created element is not an anchor"))?;
    anchor.set_href(&url);
    anchor.set_download(file_name);
    body.append_child(&anchor).map_err(js_err("attaching anchor"))?;
    anchor.click();
    anchor.remove();

    let revoke = Closure::once_into_js(move || {
        if let Err(err) = web_sys::Url::revoke_object_url(&url) {
            log::warn!("revoking object url: {err:?}");
        }
    });
    window
        .set_timeout_with_callback_and_timeout_and_arguments_0(revoke.unchecked_ref(), 0)
        .map_err(js_err("scheduling url revocation"))?;
    log::info!("downloaded {file_name} ({} bytes)", bytes.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_signature() {
        let image = RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
        let bytes = encode_png(&image).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded, image);
    }

    #[test]
    fn save_creates_missing_directories() {
        let config = crate::config::StudioConfig {
            export_dir: std::env::temp_dir()
                .join(format!("tyre-studio-export-{}", std::process::id()))
                .join("nested"),
            ..Default::default()
        };
        let path = config.export_path();
        let bytes = encode_png(&RgbaImage::new(2, 2)).unwrap();

        save_png(&bytes, &path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), bytes);
        assert!(path.ends_with("nested/engineered-elegance.png"));

        std::fs::remove_dir_all(config.export_dir.parent().unwrap()).unwrap();
    }
}
