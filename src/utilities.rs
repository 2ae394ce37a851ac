//! Internal helpers for moving pixel rows between FFmpeg frames and
//! tightly-packed `image` buffers.

use ffmpeg_next::frame::Video as VideoFrame;
use image::RgbImage;

/// Copy plane 0 of an FFmpeg frame into a tightly-packed buffer.
///
/// FFmpeg frames frequently carry per-row padding (stride > width * bpp),
/// which `image` buffers must not contain.
pub(crate) fn frame_to_buffer(
    video_frame: &VideoFrame,
    width: u32,
    height: u32,
    bytes_per_pixel: usize,
) -> Vec<u8> {
    let stride = video_frame.stride(0);
    let row_length = (width as usize) * bytes_per_pixel;
    let data = video_frame.data(0);

    if stride == row_length {
        data[..row_length * (height as usize)].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(row_length * (height as usize));
        for row in 0..(height as usize) {
            let row_start = row * stride;
            buffer.extend_from_slice(&data[row_start..row_start + row_length]);
        }
        buffer
    }
}

/// Copy a packed RGB image into plane 0 of an RGB24 FFmpeg frame,
/// honouring the frame's stride.
pub(crate) fn rgb_image_to_frame(rgb: &RgbImage, video_frame: &mut VideoFrame) {
    let row_length = (rgb.width() as usize) * 3;
    let stride = video_frame.stride(0);
    let destination = video_frame.data_mut(0);

    for (row, source_row) in rgb.as_raw().chunks_exact(row_length).enumerate() {
        let start = row * stride;
        destination[start..start + row_length].copy_from_slice(source_row);
    }
}
