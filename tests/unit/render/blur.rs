use super::*;

#[test]
fn blur_radius_0_is_identity() {
    let src = vec![1u8, 2, 3, 4, 5, 6, 7, 8];
    let out = blur_rgba8_premul(&src, 1, 2, 0, 1.0).unwrap();
    assert_eq!(out, src);
}

#[test]
fn blur_spreads_energy_from_single_pixel() {
    let (w, h) = (9u32, 9u32);
    let mut src = vec![0u8; (w * h * 4) as usize];
    let center = ((4 * w + 4) * 4) as usize;
    src[center..center + 4].copy_from_slice(&[255, 255, 255, 255]);

    let out = blur_rgba8_premul(&src, w, h, 2, 1.2).unwrap();

    let nonzero = out.chunks_exact(4).filter(|px| px[3] != 0).count();
    assert!(nonzero > 1);

    let sum_a: u32 = out.chunks_exact(4).map(|px| u32::from(px[3])).sum();
    assert!((sum_a as i32 - 255).abs() <= 6);
}

#[test]
fn edges_fade_instead_of_smearing() {
    let (w, h) = (6u32, 1u32);
    let src = [255u8, 255, 255, 255].repeat((w * h) as usize);
    let out = blur_rgba8_premul(&src, w, h, 2, 1.0).unwrap();
    assert!(out[3] < 255);
    assert!(out[(2 * 4) + 3] >= out[3]);
}

#[test]
fn rejects_mismatched_len() {
    assert!(blur_rgba8_premul(&[0u8; 7], 1, 2, 1, 1.0).is_err());
}

#[test]
fn shadow_params_follow_canvas_blur() {
    assert_eq!(shadow_blur_params(0.0), (0, 1.0));
    assert_eq!(shadow_blur_params(5.0), (8, 2.5));
}
