//! Frame stream demultiplexing.
//!
//! The frame extractor emits concatenated PNG images on one byte stream, with
//! no filler between them. Each image starts with the fixed 8-byte PNG
//! signature, so splitting is a plain signature scan over the buffer.

/// The 8-byte magic signature every PNG image starts with.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Split a concatenated PNG stream into one buffer per image.
///
/// Each segment starts at a signature offset and runs to the next signature
/// (or to the buffer end for the last one). Bytes before the first signature
/// are ignored. An empty or signature-free buffer yields zero frames, which
/// is a valid result.
pub fn split_frames(stream: &[u8]) -> Vec<Vec<u8>> {
    let offsets = signature_offsets(stream);

    offsets
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = offsets.get(i + 1).copied().unwrap_or(stream.len());
            stream[start..end].to_vec()
        })
        .collect()
}

/// Offsets of every PNG signature occurrence in `stream`, in order.
fn signature_offsets(stream: &[u8]) -> Vec<usize> {
    if stream.len() < PNG_SIGNATURE.len() {
        return Vec::new();
    }

    let mut offsets = Vec::new();
    let mut pos = 0;
    while pos + PNG_SIGNATURE.len() <= stream.len() {
        if stream[pos..pos + PNG_SIGNATURE.len()] == PNG_SIGNATURE {
            offsets.push(pos);
            // Signatures cannot overlap; skip past this one
            pos += PNG_SIGNATURE.len();
        } else {
            pos += 1;
        }
    }
    offsets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_png(body: &[u8]) -> Vec<u8> {
        let mut image = PNG_SIGNATURE.to_vec();
        image.extend_from_slice(body);
        image
    }

    #[test]
    fn test_split_three_concatenated_images() {
        let a = fake_png(b"first-image-data");
        let b = fake_png(b"second");
        let c = fake_png(b"third-image");

        let mut stream = Vec::new();
        stream.extend_from_slice(&a);
        stream.extend_from_slice(&b);
        stream.extend_from_slice(&c);

        let frames = split_frames(&stream);
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0], a);
        assert_eq!(frames[1], b);
        assert_eq!(frames[2], c);
    }

    #[test]
    fn test_every_frame_starts_with_signature() {
        let stream = [fake_png(b"x"), fake_png(b"y")].concat();
        for frame in split_frames(&stream) {
            assert_eq!(&frame[..8], &PNG_SIGNATURE);
        }
    }

    #[test]
    fn test_single_image() {
        let a = fake_png(b"only");
        let frames = split_frames(&a);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0], a);
    }

    #[test]
    fn test_empty_stream_yields_zero_frames() {
        assert!(split_frames(&[]).is_empty());
        assert!(split_frames(b"no signature here").is_empty());
    }

    #[test]
    fn test_leading_garbage_is_ignored() {
        let mut stream = b"garbage".to_vec();
        stream.extend_from_slice(&fake_png(b"real"));

        let frames = split_frames(&stream);
        assert_eq!(frames.len(), 1);
        assert_eq!(&frames[0][..8], &PNG_SIGNATURE);
    }

    #[test]
    fn test_deterministic() {
        let stream = [fake_png(b"a"), fake_png(b"b")].concat();
        assert_eq!(split_frames(&stream), split_frames(&stream));
    }
}
