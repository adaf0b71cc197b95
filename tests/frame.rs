//! Whole-frame tests for the scan-out, drawing into a framebuffer and
//! checking what would come out of the colour pins.

// -----------------------------------------------------------------------------
// Licence Statement
// -----------------------------------------------------------------------------
// Copyright (c) Jonathan 'theJPster' Pallant and the Neotron Developers, 2023
// Copyright (c) The pico-vgax developers, 2025
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later
// version.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more
// details.
//
// You should have received a copy of the GNU General Public License along with
// this program.  If not, see <https://www.gnu.org/licenses/>.
// -----------------------------------------------------------------------------

use pico_vgax::{
    config::{BYTES_PER_LINE, HEIGHT, SKIP_LINES, TIMING, VERTICAL_SCALE, WIDTH},
    emit, Colour, FrameCounter, Framebuffer, LineKind, Scanout,
};

/// Run one whole frame, returning what happened on every line and the
/// pixels sent on each line that had any.
fn run_frame(
    scan: &mut Scanout,
    frames: &FrameCounter,
    fb: &Framebuffer,
) -> (Vec<LineKind>, Vec<Vec<Colour>>) {
    let mut kinds = Vec::new();
    let mut pictures = Vec::new();
    scan.on_frame(frames);
    for _ in 0..TIMING.frame_lines() {
        let kind = scan.on_line(|row| {
            let start = row * BYTES_PER_LINE;
            let mut bytes = [0u8; BYTES_PER_LINE];
            for (idx, byte) in bytes.iter_mut().enumerate() {
                // Safety: the framebuffer is 1920 bytes and row < 80
                *byte = unsafe { *fb.as_ptr().add(start + idx) };
            }
            let line: Vec<Colour> = emit::samples(&bytes).map(emit::sample_colour).collect();
            pictures.push(line);
        });
        kinds.push(kind);
    }
    (kinds, pictures)
}

#[test]
fn frame_has_the_right_shape() {
    let frames = FrameCounter::new();
    let fb = Framebuffer::new();
    let mut scan = Scanout::new();
    let (kinds, pictures) = run_frame(&mut scan, &frames, &fb);

    let skip = usize::from(SKIP_LINES);
    let active = HEIGHT * usize::from(VERTICAL_SCALE);
    assert_eq!(kinds.len(), 525);
    assert!(kinds[..skip].iter().all(|k| *k == LineKind::Blanking));
    assert!(kinds[skip + active..].iter().all(|k| *k == LineKind::Idle));
    assert_eq!(pictures.len(), 400);
    for (idx, kind) in kinds[skip..skip + active].iter().enumerate() {
        assert_eq!(
            *kind,
            LineKind::Pixels {
                row: (idx / usize::from(VERTICAL_SCALE)) as u16
            }
        );
    }
}

#[test]
fn first_rows_after_blanking() {
    let frames = FrameCounter::new();
    let fb = Framebuffer::new();
    let mut scan = Scanout::new();
    let (kinds, _) = run_frame(&mut scan, &frames, &fb);
    let skip = usize::from(SKIP_LINES);
    let rows: Vec<u16> = kinds[skip..skip + 25]
        .iter()
        .map(|k| match k {
            LineKind::Pixels { row } => *row,
            other => panic!("expected pixels, got {:?}", other),
        })
        .collect();
    assert_eq!(
        rows,
        [0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 3, 3, 3, 3, 3, 4, 4, 4, 4, 4]
    );
}

#[test]
fn picture_matches_framebuffer() {
    let frames = FrameCounter::new();
    let fb = Framebuffer::new();
    fb.clear(Colour::BLACK);
    fb.fill_rect(10, 20, 30, 5, Colour::RED);
    fb.put_pixel(0, 0, Colour::YELLOW);
    fb.put_pixel(95, 79, Colour::GREEN);
    let mut scan = Scanout::new();
    let (_, pictures) = run_frame(&mut scan, &frames, &fb);

    for (line_idx, line) in pictures.iter().enumerate() {
        let y = line_idx / usize::from(VERTICAL_SCALE);
        assert_eq!(line.len(), WIDTH + 1);
        // Always blank after the last pixel
        assert_eq!(line[WIDTH], Colour::BLACK);
        for (x, colour) in line[..WIDTH].iter().enumerate() {
            assert_eq!(*colour, fb.get_pixel(x as u16, y as u16), "x={} y={}", x, y);
        }
    }
    assert_eq!(pictures[0][0], Colour::YELLOW);
    assert_eq!(pictures[399][95], Colour::GREEN);
    assert_eq!(pictures[20 * 5][10], Colour::RED);
    assert_eq!(pictures[20 * 5][40], Colour::BLACK);
}

#[test]
fn nothing_drawn_before_first_vsync() {
    let mut scan = Scanout::new();
    for _ in 0..TIMING.frame_lines() {
        assert_eq!(scan.on_line(|_| panic!("drew before V-Sync")), LineKind::Idle);
    }
}

#[test]
fn elapsed_time_follows_frames() {
    let frames = FrameCounter::new();
    let fb = Framebuffer::new();
    let mut scan = Scanout::new();
    assert_eq!(frames.elapsed_millis().ticks(), 0);
    for expected in 1..=60u32 {
        run_frame(&mut scan, &frames, &fb);
        assert_eq!(frames.frames(), expected);
    }
    assert_eq!(frames.elapsed_millis().ticks(), 1000);
    assert_eq!(frames.elapsed_micros().ticks(), 1_000_000);
}

// End of file
