#![no_main]

use arbitrary::Arbitrary;
use image::GrayImage;
use libfuzzer_sys::fuzz_target;
use webpre::metrics::{similarity, SsimReference};

#[derive(Arbitrary, Debug)]
struct SsimInput {
    width: u8,
    height: u8,
    other_width: u8,
    pixels: Vec<u8>,
}

fuzz_target!(|input: SsimInput| {
    let (w, h) = (input.width as u32, input.height as u32);
    let len = (w * h) as usize;
    if input.pixels.len() < len * 2 {
        return;
    }
    let Some(a) = GrayImage::from_raw(w, h, input.pixels[..len].to_vec()) else {
        return;
    };
    let Some(b) = GrayImage::from_raw(w, h, input.pixels[len..len * 2].to_vec()) else {
        return;
    };

    if let Ok(s) = similarity(&a, &b) {
        assert!(s.is_finite());
        assert!((-1.0 - 1e-9..=1.0 + 1e-9).contains(&s));
        if let Ok(reference) = SsimReference::new(&a) {
            assert_eq!(reference.compare(&b).ok(), Some(s));
        }
    }

    // A mismatched candidate is an error, never a panic.
    let ow = input.other_width as u32;
    if ow != w && ow as usize * h as usize <= input.pixels.len() {
        if let Some(c) = GrayImage::from_raw(ow, h, input.pixels[..(ow * h) as usize].to_vec()) {
            assert!(similarity(&a, &c).is_err());
        }
    }
});
