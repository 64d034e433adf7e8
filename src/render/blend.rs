use crate::foundation::core::{Canvas, Rgba8Premul};
use crate::foundation::error::{PaintoverError, PaintoverResult};
use crate::foundation::math::{add_sat_u8, mul_div255_u8};

/// Premultiplied source-over of a single pixel.
pub(crate) fn premul_over_px(dst: [u8; 4], src: [u8; 4]) -> [u8; 4] {
    let sa = src[3] as u16;
    if sa == 0 {
        return dst;
    }
    let inv = 255u16 - sa;
    let mut out = [0u8; 4];
    out[3] = add_sat_u8(src[3], mul_div255_u8(u16::from(dst[3]), inv));
    for c in 0..3 {
        let dc = mul_div255_u8(u16::from(dst[c]), inv);
        out[c] = add_sat_u8(src[c], dc);
    }
    out
}

/// Source-over of two equal-length premultiplied buffers.
pub(crate) fn premul_over_in_place(dst: &mut [u8], src: &[u8]) -> PaintoverResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(PaintoverError::validation(
            "premul_over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        if s[3] == 0 {
            continue;
        }
        let out = premul_over_px([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Source-over of a `src_w x src_h` tile placed at `(x0, y0)` inside `dst`.
///
/// Tile pixels falling outside `dst` are ignored.
pub(crate) fn premul_over_region(
    dst: &mut [u8],
    dst_canvas: Canvas,
    src: &[u8],
    src_w: u32,
    src_h: u32,
    x0: u32,
    y0: u32,
) -> PaintoverResult<()> {
    if dst.len() != dst_canvas.rgba8_len() || src.len() != (src_w as usize) * (src_h as usize) * 4
    {
        return Err(PaintoverError::validation(
            "premul_over_region buffer sizes do not match their dimensions",
        ));
    }
    let dw = dst_canvas.width as usize;
    let cols = src_w.min(dst_canvas.width.saturating_sub(x0)) as usize;
    let rows = src_h.min(dst_canvas.height.saturating_sub(y0)) as usize;
    if cols == 0 || rows == 0 {
        return Ok(());
    }
    for row in 0..rows {
        let s_row = row * (src_w as usize) * 4;
        let d_row = ((y0 as usize + row) * dw + x0 as usize) * 4;
        let s = &src[s_row..s_row + cols * 4];
        let d = &mut dst[d_row..d_row + cols * 4];
        premul_over_in_place(d, s)?;
    }
    Ok(())
}

/// Source-constrained fill: pixels with any coverage become `color`, the rest transparent.
pub(crate) fn source_in_fill(buf: &mut [u8], color: Rgba8Premul) {
    let px = color.to_array();
    for d in buf.chunks_exact_mut(4) {
        if d[3] == 0 {
            d.copy_from_slice(&[0, 0, 0, 0]);
        } else {
            d.copy_from_slice(&px);
        }
    }
}

/// Keep `selection` only where `backdrop` has non-zero alpha.
///
/// Both buffers must describe the same canvas.
pub(crate) fn keep_over_backdrop(selection: &mut [u8], backdrop: &[u8]) -> PaintoverResult<()> {
    if selection.len() != backdrop.len() || !selection.len().is_multiple_of(4) {
        return Err(PaintoverError::validation(
            "keep_over_backdrop expects equal-length rgba8 buffers",
        ));
    }
    for (s, b) in selection.chunks_exact_mut(4).zip(backdrop.chunks_exact(4)) {
        if b[3] == 0 {
            s.copy_from_slice(&[0, 0, 0, 0]);
        }
    }
    Ok(())
}

/// Scale every pixel's premultiplied channels by `color`'s alpha and recolor to `color`.
///
/// Used to turn a rendered text layer into its drop-shadow silhouette.
pub(crate) fn tint_by_alpha(buf: &mut [u8], color: Rgba8Premul) {
    for d in buf.chunks_exact_mut(4) {
        let a = u16::from(d[3]);
        if a == 0 {
            continue;
        }
        d[0] = mul_div255_u8(u16::from(color.r), a);
        d[1] = mul_div255_u8(u16::from(color.g), a);
        d[2] = mul_div255_u8(u16::from(color.b), a);
        d[3] = mul_div255_u8(u16::from(color.a), a);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/blend.rs"]
mod tests;
