#![no_main]

use libfuzzer_sys::fuzz_target;
use webpre::engine::{decode_image, sniff_webp};
use webpre::metrics::to_grayscale;
use webpre::{LossyCodec, WebpCodec};

fuzz_target!(|data: &[u8]| {
    // Sniffing must accept any prefix.
    let native = sniff_webp(data);

    if let Ok((img, _)) = decode_image(data) {
        let _ = to_grayscale(&img);
    }
    if native {
        let _ = WebpCodec.decode(data);
    }
});
