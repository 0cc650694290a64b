use crate::frame::HeroContext;
use hero_core::{HeroError, ImageRequest};
use std::cell::RefCell;
use std::rc::Weak;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

async fn fetch_bytes(url: &str) -> Result<Vec<u8>, HeroError> {
    let window = web::window().ok_or_else(|| HeroError::ImageFetch("no window".into()))?;
    let resp = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|e| HeroError::ImageFetch(format!("{:?}", e)))?;
    let resp: web::Response = resp
        .dyn_into()
        .map_err(|e| HeroError::ImageFetch(format!("{:?}", e)))?;
    if !resp.ok() {
        return Err(HeroError::ImageFetch(format!("HTTP {} for {}", resp.status(), url)));
    }
    let promise = resp
        .array_buffer()
        .map_err(|e| HeroError::ImageFetch(format!("{:?}", e)))?;
    let buf = JsFuture::from(promise)
        .await
        .map_err(|e| HeroError::ImageFetch(format!("{:?}", e)))?;
    Ok(js_sys::Uint8Array::new(&buf).to_vec())
}

pub async fn fetch_image(url: &str) -> Result<image::RgbaImage, HeroError> {
    let bytes = fetch_bytes(url).await?;
    let decoded = image::load_from_memory(&bytes).map_err(|e| HeroError::ImageDecode(e.to_string()))?;
    Ok(decoded.to_rgba8())
}

/// Fetch, decode and upload `req` in the background, then hand the texture
/// to the hero. Nothing touches the context if it was dropped or disposed
/// while the fetch was in flight; a follow-up prefetch is chained.
pub fn spawn_load(ctx: Weak<RefCell<HeroContext>>, req: ImageRequest) {
    log::info!("[loader] fetching {:?} image {}", req.slot, req.url);
    spawn_local(async move {
        let result = fetch_image(&req.url).await;
        let Some(ctx_rc) = ctx.upgrade() else {
            log::debug!("[loader] context gone, dropping {}", req.url);
            return;
        };
        let follow_up = {
            let mut c = ctx_rc.borrow_mut();
            if c.disposed {
                return;
            }
            match result {
                Ok(img) => {
                    let tex = c.gpu.upload_image(img);
                    let (w, h) = tex.size();
                    log::debug!("[loader] uploaded {}x{}", w, h);
                    c.hero.on_image_loaded(req.ticket, tex)
                }
                Err(e) => {
                    c.hero.on_image_failed(req.ticket, &e);
                    None
                }
            }
        };
        if let Some(next) = follow_up {
            spawn_load(ctx, next);
        }
    });
}
