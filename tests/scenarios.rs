use image::{GenericImageView, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use stichy_collage::{
    encode_jpeg, plan, Compositor, CompositionRequest, Photo, CANVAS_SIZE, FOOTER_HEIGHT, GAP,
    HEADER_HEIGHT, NAME_TAG_HEIGHT,
};

const COLORS: [[u8; 3]; 9] = [
    [255, 0, 0],
    [0, 160, 0],
    [0, 0, 255],
    [255, 200, 0],
    [200, 0, 200],
    [0, 200, 200],
    [120, 60, 0],
    [60, 60, 60],
    [255, 128, 128],
];

fn photo(width: u32, height: u32, color: [u8; 3], name: &str) -> Photo {
    let img = RgbImage::from_pixel(width, height, Rgb(color));
    Photo::new(encode_jpeg(&img, 95).unwrap(), name)
}

fn png_photo(width: u32, height: u32, color: [u8; 3], name: &str) -> Photo {
    let img = RgbImage::from_pixel(width, height, Rgb(color));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png).unwrap();
    Photo::new(buf, name)
}

fn compositor() -> Compositor {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
    Compositor::new()
}

fn request(photos: Vec<Photo>) -> CompositionRequest {
    CompositionRequest::new("Coffee", "☕", "2026.02.05", "Best Friends").with_photos(photos)
}

fn close(actual: Rgb<u8>, expected: [u8; 3]) -> bool {
    actual.0.iter().zip(expected).all(|(a, e)| a.abs_diff(e) <= 30)
}

/// A pixel well inside the photo area of a cell, above its name tag.
fn sample_point(cell: stichy_collage::Cell) -> (u32, u32) {
    (cell.x + cell.width / 2, cell.y + (cell.height - NAME_TAG_HEIGHT) / 2)
}

#[test]
fn two_member_collage() {
    let compositor = compositor();
    let req = request(vec![
        photo(400, 400, COLORS[0], "Alice"),
        photo(400, 400, COLORS[2], "Bob"),
    ]);

    let bytes = compositor.compose(&req).unwrap();
    let decoded = image::load_from_memory(&bytes).unwrap();
    assert_eq!(decoded.dimensions(), (CANVAS_SIZE, CANVAS_SIZE));
    let canvas = decoded.to_rgb8();

    let layout = plan(2);
    assert_eq!(layout.cells[0].width, layout.cells[1].width);
    let (x, y) = sample_point(layout.cells[0]);
    assert!(close(*canvas.get_pixel(x, y), COLORS[0]));
    let (x, y) = sample_point(layout.cells[1]);
    assert!(close(*canvas.get_pixel(x, y), COLORS[2]));

    // header and footer bands are light background at their edges
    assert!(close(*canvas.get_pixel(3, 3), [255, 255, 255]));
    assert!(close(*canvas.get_pixel(3, CANVAS_SIZE - 3), [255, 255, 255]));

    if stichy_collage::SvgRasterizer::new(&[]).face_count() > 0 {
        let dark_in = |y0: u32, y1: u32| {
            (y0..y1)
                .flat_map(|y| (0..CANVAS_SIZE).map(move |x| (x, y)))
                .filter(|&(x, y)| canvas.get_pixel(x, y)[0] < 180)
                .count()
        };
        assert!(dark_in(0, HEADER_HEIGHT) > 200, "date and keyword not drawn");
        assert!(dark_in(CANVAS_SIZE - FOOTER_HEIGHT, CANVAS_SIZE) > 100, "group name not drawn");
    }
}

#[test]
fn five_member_rows() {
    let layout = plan(5);
    let h = (CANVAS_SIZE - HEADER_HEIGHT - FOOTER_HEIGHT) / 2 - GAP;
    let half = (CANVAS_SIZE - GAP) / 2;
    let third = (CANVAS_SIZE - 2 * GAP) / 3;

    assert!(layout.cells[..2].iter().all(|c| c.width == half && c.y == HEADER_HEIGHT));
    assert!(layout.cells[2..].iter().all(|c| c.width == third && c.y == HEADER_HEIGHT + h + GAP));
    assert!(layout.cells.iter().all(|c| c.height == h));
}

#[test]
fn ninth_photo_dropped_with_eight_cell_layout() {
    let compositor = compositor();
    let photos = COLORS
        .iter()
        .enumerate()
        .map(|(i, c)| photo(120, 90, *c, &format!("M{i}")))
        .collect();
    let req = request(photos);

    let layout = plan(8);
    assert!(layout.len() < req.photo_count());
    let canvas = compositor.render_with_layout(&req, &layout).unwrap();

    for (i, cell) in layout.cells.iter().enumerate() {
        let (x, y) = sample_point(*cell);
        let pixel = *canvas.get_pixel(x, y);
        assert!(close(pixel, COLORS[i]), "cell {i}");
        assert!(!close(pixel, COLORS[8]), "ninth photo leaked into cell {i}");
    }

    let bytes = compositor.compose_with_layout(&req, &layout).unwrap();
    let decoded = image::load_from_memory(&bytes).unwrap();
    assert_eq!(decoded.dimensions(), (CANVAS_SIZE, CANVAS_SIZE));
}

#[test]
fn fallback_for_nine_photos_uses_four_cells() {
    let compositor = compositor();
    let photos = COLORS.iter().map(|c| png_photo(50, 50, *c, "x")).collect();
    let req = request(photos);

    let layout = compositor.plan(req.photo_count());
    assert_eq!(layout.len(), 4);

    let canvas = compositor.render(&req).unwrap();
    for (i, cell) in layout.cells.iter().enumerate() {
        let (x, y) = sample_point(*cell);
        assert!(close(*canvas.get_pixel(x, y), COLORS[i]), "cell {i}");
    }
}

#[test]
fn arbitrary_aspect_ratios_fill_cells() {
    let compositor = compositor();
    let req = request(vec![
        png_photo(1600, 200, COLORS[0], "Panorama"),
        png_photo(90, 1200, COLORS[1], "Tall"),
        png_photo(1, 1, COLORS[2], "Tiny"),
    ]);

    let canvas = compositor.render(&req).unwrap();
    assert_eq!(canvas.dimensions(), (CANVAS_SIZE, CANVAS_SIZE));

    for (i, cell) in plan(3).cells.iter().enumerate() {
        // corners of the cell are photo, not background: no letterboxing
        let corner = *canvas.get_pixel(cell.x + 1, cell.y + 1);
        assert!(close(corner, COLORS[i]), "cell {i} corner {corner:?}");
    }
}

#[test]
fn markup_characters_in_names_and_captions() {
    let compositor = compositor();
    let req = CompositionRequest::new("<b>Tea & Cake</b>", "", "2026.02.05", "R&D <crew>")
        .with_photo(photo(200, 200, COLORS[0], "Tom & Jerry"))
        .with_photo(photo(200, 200, COLORS[1], "<script>"))
        .with_photo(photo(200, 200, COLORS[2], "a>b"));

    let bytes = compositor.compose(&req).unwrap();
    let decoded = image::load_from_memory(&bytes).unwrap();
    assert_eq!(decoded.dimensions(), (CANVAS_SIZE, CANVAS_SIZE));
}

#[test]
fn empty_photo_list_renders_bands_only() {
    let compositor = compositor();
    let bytes = compositor.compose(&request(Vec::new())).unwrap();
    let canvas = image::load_from_memory(&bytes).unwrap().to_rgb8();

    assert_eq!(canvas.dimensions(), (CANVAS_SIZE, CANVAS_SIZE));
    assert!(close(*canvas.get_pixel(540, 540), [255, 255, 255]));
}

#[test]
fn output_decodes_for_every_count() {
    let compositor = compositor();
    for count in 0..=10 {
        let photos = (0..count)
            .map(|i| png_photo(64 + i as u32 * 10, 48, COLORS[i % COLORS.len()], "m"))
            .collect();
        let bytes = compositor.compose(&request(photos)).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (CANVAS_SIZE, CANVAS_SIZE), "count {count}");
    }
}

#[test]
fn concurrent_compositions_share_one_compositor() {
    let compositor = compositor();
    std::thread::scope(|scope| {
        let handles: Vec<_> = (2..=5)
            .map(|count| {
                let compositor = &compositor;
                scope.spawn(move || {
                    let photos = (0..count).map(|i| png_photo(32, 32, COLORS[i], "m")).collect();
                    compositor.compose(&request(photos)).map(|b| b.len())
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap().unwrap() > 0);
        }
    });
}
