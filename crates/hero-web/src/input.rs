use web_sys as web;

/// Map a client-space point (CSS pixels) into canvas backing-store pixels.
/// Returns `None` while the canvas has no layout size.
#[inline]
pub fn client_to_canvas_px(
    client: [f32; 2],
    rect_origin: [f32; 2],
    rect_size: [f32; 2],
    backing: [u32; 2],
) -> Option<[f32; 2]> {
    let [w, h] = rect_size;
    if !(w > 0.0 && h > 0.0) {
        return None;
    }
    let x_css = client[0] - rect_origin[0];
    let y_css = client[1] - rect_origin[1];
    Some([
        (x_css / w) * backing[0] as f32,
        (y_css / h) * backing[1] as f32,
    ])
}

#[inline]
pub fn client_px_on_canvas(
    client_x: f32,
    client_y: f32,
    canvas: &web::HtmlCanvasElement,
) -> Option<[f32; 2]> {
    let rect = canvas.get_bounding_client_rect();
    client_to_canvas_px(
        [client_x, client_y],
        [rect.left() as f32, rect.top() as f32],
        [rect.width() as f32, rect.height() as f32],
        [canvas.width(), canvas.height()],
    )
}

#[inline]
pub fn pointer_canvas_px(ev: &web::PointerEvent, canvas: &web::HtmlCanvasElement) -> Option<[f32; 2]> {
    client_px_on_canvas(ev.client_x() as f32, ev.client_y() as f32, canvas)
}

#[inline]
pub fn touch_canvas_px(touch: &web::Touch, canvas: &web::HtmlCanvasElement) -> Option<[f32; 2]> {
    client_px_on_canvas(touch.client_x() as f32, touch.client_y() as f32, canvas)
}
