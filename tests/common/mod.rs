#![allow(dead_code)]

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

/// Three separate ink blocks on one row, left to right
pub const THREE_BLOCKS: [(u32, u32, u32, u32); 3] = [(10, 10, 8, 16), (40, 10, 8, 16), (70, 10, 8, 16)];

/// White page with solid black rectangles (x, y, w, h), PNG encoded
pub fn page_png(width: u32, height: u32, blocks: &[(u32, u32, u32, u32)]) -> Vec<u8> {
    let mut img = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
    for &(x, y, w, h) in blocks {
        for py in y..y + h {
            for px in x..x + w {
                img.put_pixel(px, py, Rgb([0, 0, 0]));
            }
        }
    }

    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

pub fn three_block_page() -> Vec<u8> {
    page_png(100, 40, &THREE_BLOCKS)
}

/// Tab produced for pitches 60, 61, 62 by the default reader
pub fn three_block_tab() -> String {
    let empty = "-".repeat(22);
    [
        format!("e|{}", empty),
        format!("B|123{}", "-".repeat(19)),
        format!("G|{}", empty),
        format!("D|{}", empty),
        format!("A|{}", empty),
        format!("E|{}", empty),
    ]
    .join("\n")
}
