use super::*;
use crate::wire::fcs;

fn decode_all(decoder: &mut Decoder, line: &[u8]) -> Vec<Vec<u8>> {
    let mut frames = Vec::new();
    for &byte in line {
        if let Some(frame) = decoder.receive_byte(byte) {
            frames.push(frame.to_vec());
        }
    }
    frames
}

#[test]
fn encode_lcp() {
    let mut encoder = Encoder::new();
    let frame = [0xc0, 0x21, 0x05, 0x01, 0x00, 0x04];
    let check = fcs::fcs16(&[0xff, 0x03, 0xc0, 0x21, 0x05, 0x01, 0x00, 0x04]).to_le_bytes();

    let mut expected = vec![0x7e, 0xff, 0x7d, 0x23, 0xc0, 0x21, 0x7d, 0x25, 0x7d, 0x21, 0x7d, 0x20, 0x7d, 0x24];
    for &byte in check.iter() {
        if byte < 0x20 || byte == 0x7d || byte == 0x7e {
            expected.extend_from_slice(&[0x7d, byte ^ 0x20]);
        } else {
            expected.push(byte);
        }
    }
    expected.push(0x7e);

    assert_eq!(encoder.encode(&frame, Framing::DEFAULT), &expected[..]);
}

#[test]
fn encode_compressed() {
    let mut encoder = Encoder::new();
    let framing = Framing { accm: 0, acfc: true };
    let encoded = encoder.encode(&[0x21, 0x45, 0x00], framing).to_vec();
    assert_eq!(&encoded[..4], &[0x7e, 0x21, 0x45, 0x00]);

    let mut decoder = Decoder::new();
    assert!(decode_all(&mut decoder, &encoded).is_empty());
    assert_eq!(decoder.statistics().malformed, 1);

    decoder.set_acfc(true);
    assert_eq!(decode_all(&mut decoder, &encoded), vec![vec![0x21, 0x45, 0x00]]);
}

#[test]
fn round_trip() {
    let payloads: [&[u8]; 4] = [
        &[0xc0, 0x21, 0x01, 0x01, 0x00, 0x04],
        &[0x00, 0x21, 0x7e, 0x7d, 0x7e, 0x7d, 0x5e, 0x5d],
        &[0x80, 0x21, 0x00, 0x01, 0x02, 0x03, 0x11, 0x13, 0x1f, 0x20, 0xff],
        &[0x00, 0x21],
    ];
    let framings = [
        Framing::DEFAULT,
        Framing { accm: 0, acfc: false },
        Framing { accm: 0x000a_0000, acfc: false },
    ];

    let mut encoder = Encoder::new();
    let mut decoder = Decoder::new();
    for framing in framings.iter() {
        for payload in payloads.iter() {
            let encoded = encoder.encode(payload, *framing).to_vec();
            assert_eq!(encoded.iter().filter(|&&byte| byte == 0x7e).count(), 2);
            assert_eq!(decode_all(&mut decoder, &encoded), vec![payload.to_vec()]);

            // Re-encoding the decoded frame is stable.
            let again = encoder.encode(payload, *framing).to_vec();
            assert_eq!(again, encoded);
        }
    }
}

#[test]
fn escapes_per_accm() {
    let mut encoder = Encoder::new();
    let frame = [0x00, 0x21, 0x11, 0x13, 0x01];

    let open = encoder.encode(&frame, Framing { accm: 0, acfc: true }).to_vec();
    assert!(open.windows(2).any(|pair| pair == [0x11, 0x13]));

    let map = (1 << 0x11) | (1 << 0x13);
    let escaped = encoder.encode(&frame, Framing { accm: map, acfc: true }).to_vec();
    assert!(escaped.windows(2).any(|pair| pair == [0x7d, 0x31]));
    assert!(escaped.windows(2).any(|pair| pair == [0x7d, 0x33]));
    assert!(escaped.contains(&0x01));
    assert!(!escaped.contains(&0x11));
    assert!(!escaped.contains(&0x13));
}

#[test]
fn shared_flags() {
    let mut encoder = Encoder::new();
    let first = encoder.encode(&[0xc0, 0x21, 0x01], Framing::DEFAULT).to_vec();
    let second = encoder.encode(&[0x80, 0x21, 0x02], Framing::DEFAULT).to_vec();

    // Closing flag of the first frame opens the second one.
    let mut line = first.clone();
    line.extend_from_slice(&second[1..]);
    // Repeated flags between frames are idle fill.
    line.extend_from_slice(&[0x7e, 0x7e, 0x7e]);
    line.extend_from_slice(&first);

    let mut decoder = Decoder::new();
    let frames = decode_all(&mut decoder, &line);
    assert_eq!(frames, vec![
        vec![0xc0, 0x21, 0x01],
        vec![0x80, 0x21, 0x02],
        vec![0xc0, 0x21, 0x01],
    ]);
    assert_eq!(decoder.statistics().frames, 3);
}

#[test]
fn noise_before_first_flag() {
    let mut encoder = Encoder::new();
    let frame = encoder.encode(&[0xc0, 0x21, 0x09], Framing::DEFAULT).to_vec();

    let mut line = b"ATDT123\r\n\x7d".to_vec();
    line.extend_from_slice(&frame);

    let mut decoder = Decoder::new();
    assert_eq!(decode_all(&mut decoder, &line), vec![vec![0xc0, 0x21, 0x09]]);
}

#[test]
fn bad_check_sequence() {
    let mut encoder = Encoder::new();
    let mut frame = encoder.encode(&[0xc0, 0x21, 0x09, 0x01], Framing::DEFAULT).to_vec();
    // Flip a bit of the protocol field, which is never escaped.
    frame[4] ^= 0x40;

    let mut decoder = Decoder::new();
    assert!(decode_all(&mut decoder, &frame).is_empty());
    assert_eq!(decoder.statistics().checksum, 1);
}

#[test]
fn bad_address() {
    let mut encoder = Encoder::new();
    // With compression the encoder adds no header of its own.
    let line = encoder.encode(&[0xfe, 0x03, 0xc0, 0x21], Framing { accm: 0, acfc: true }).to_vec();

    let mut decoder = Decoder::new();
    assert!(decode_all(&mut decoder, &line).is_empty());
    assert_eq!(decoder.statistics().malformed, 1);
    assert_eq!(decoder.statistics().frames, 0);
}

#[test]
fn oversized_frame() {
    let mut decoder = Decoder::with_capacity(16);
    let mut line = vec![0x7e];
    line.extend_from_slice(&[0x55; 40]);
    line.push(0x7e);

    assert!(decode_all(&mut decoder, &line).is_empty());
    assert_eq!(decoder.statistics().oversize, 1);

    // The decoder recovers with the next frame.
    let mut encoder = Encoder::new();
    let frame = encoder.encode(&[0xc0, 0x21, 0x01], Framing::DEFAULT).to_vec();
    assert_eq!(decode_all(&mut decoder, &frame[1..]), vec![vec![0xc0, 0x21, 0x01]]);
}

#[test]
fn abort_sequence() {
    let mut encoder = Encoder::new();
    let frame = encoder.encode(&[0xc0, 0x21, 0x01], Framing::DEFAULT).to_vec();

    let mut line = vec![0x7e, 0xff, 0x7d, 0x23, 0xc0, 0x7d, 0x7e];
    line.extend_from_slice(&frame[1..]);

    let mut decoder = Decoder::new();
    assert_eq!(decode_all(&mut decoder, &line), vec![vec![0xc0, 0x21, 0x01]]);
    assert_eq!(decoder.statistics().aborted, 1);
}
