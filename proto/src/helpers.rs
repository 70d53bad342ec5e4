// Copyright (c) 2022-2023 The MobileCoin Foundation

use crate::ProtoError;

/// Write a byte slice at `index`, returning the new index
pub(crate) fn write_bytes(buff: &mut [u8], index: usize, d: &[u8]) -> Result<usize, ProtoError> {
    if buff.len() < index + d.len() {
        return Err(ProtoError::InvalidLength);
    }

    buff[index..][..d.len()].copy_from_slice(d);

    Ok(index + d.len())
}

/// Read `n` bytes at `index`, returning the slice and the new index
pub(crate) fn read_bytes(buff: &[u8], index: usize, n: usize) -> Result<(&[u8], usize), ProtoError> {
    if buff.len() < index + n {
        return Err(ProtoError::InvalidLength);
    }

    Ok((&buff[index..][..n], index + n))
}

/// Read a utf8 string of `n` bytes at `index`
pub(crate) fn read_str(buff: &[u8], index: usize, n: usize) -> Result<(&str, usize), ProtoError> {
    let (d, index) = read_bytes(buff, index, n)?;
    let s = core::str::from_utf8(d).map_err(|_| ProtoError::InvalidUtf8)?;

    Ok((s, index))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn bounds_checked() {
        let mut b = [0u8; 4];
        assert_eq!(write_bytes(&mut b, 2, &[1, 2, 3]), Err(ProtoError::InvalidLength));
        assert_eq!(write_bytes(&mut b, 1, &[1, 2, 3]), Ok(4));

        assert_eq!(read_bytes(&b, 1, 3), Ok((&[1u8, 2, 3][..], 4)));
        assert_eq!(read_bytes(&b, 1, 4), Err(ProtoError::InvalidLength));

        let s = [0xffu8, 0xfe];
        assert_eq!(read_str(&s, 0, 2), Err(ProtoError::InvalidUtf8));
    }
}
