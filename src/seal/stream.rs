use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use zeroize::Zeroizing;

use crate::config::DEFAULT_STREAM_PAD_SIZE;
use crate::error::{CryptoError, Result};
use crate::keys::SecretKey;
use crate::nonce::Nonce;
use crate::operation::StreamOp;

static DEFAULT_PAD_SIZE: AtomicUsize = AtomicUsize::new(DEFAULT_STREAM_PAD_SIZE);

/// Install the process-wide pad size used by [`Streamer::new`].
///
/// # Errors
/// `Size` for a zero pad; the previous value is kept.
pub fn set_default_pad_size(pad_size: usize) -> Result<()> {
    if pad_size == 0 {
        return Err(CryptoError::size(DEFAULT_STREAM_PAD_SIZE, 0));
    }
    DEFAULT_PAD_SIZE.store(pad_size, Ordering::Relaxed);
    Ok(())
}

pub fn default_pad_size() -> usize {
    DEFAULT_PAD_SIZE.load(Ordering::Relaxed)
}

/// XOR keystream over a byte stream of any length.
///
/// Keystream is produced a pad at a time. Each refill uses the current
/// nonce and then advances it, so two streamers built from the same key,
/// nonce and pad size produce the same keystream. Applying it twice gives
/// back the input; there is no authentication.
pub struct Streamer<'k, 'n, O: StreamOp> {
    key: &'k SecretKey<O>,
    nonce: &'n mut Nonce<O>,
    pad: Zeroizing<Vec<u8>>,
    used: usize,
}

impl<'k, 'n, O: StreamOp> Streamer<'k, 'n, O> {
    /// Streamer with the process-wide pad size, see [`set_default_pad_size`].
    pub fn new(key: &'k SecretKey<O>, nonce: &'n mut Nonce<O>) -> Result<Self> {
        Self::with_pad_size(key, nonce, default_pad_size())
    }

    pub fn with_pad_size(key: &'k SecretKey<O>, nonce: &'n mut Nonce<O>, pad_size: usize) -> Result<Self> {
        if pad_size == 0 {
            return Err(CryptoError::size(DEFAULT_STREAM_PAD_SIZE, 0));
        }
        nonce.ensure_usable()?;
        Ok(Self {
            key,
            nonce,
            pad: Zeroizing::new(vec![0u8; pad_size]),
            // Empty pad; the first byte triggers a refill
            used: pad_size,
        })
    }

    fn refill(&mut self) -> Result<()> {
        self.nonce.ensure_usable()?;
        O::keystream(&self.key.expose()?, self.nonce.as_bytes(), &mut self.pad)?;
        self.nonce.increment()?;
        self.used = 0;
        tracing::trace!(operation = %O::OPERATION, pad = self.pad.len(), "refilled keystream pad");
        Ok(())
    }

    /// XOR `data` in place with the next `data.len()` keystream bytes.
    ///
    /// # Errors
    /// `Overflow` if the nonce cannot cover every refill `data` needs. This
    /// is checked up front, so on error `data` and the streamer are untouched.
    pub fn apply(&mut self, data: &mut [u8]) -> Result<()> {
        let buffered = self.pad.len() - self.used;
        let refills = data.len().saturating_sub(buffered).div_ceil(self.pad.len());
        if refills > 0 && !self.nonce.has_headroom(refills as u64) {
            return Err(CryptoError::Overflow);
        }

        let mut rest = data;
        while !rest.is_empty() {
            if self.used == self.pad.len() {
                self.refill()?;
            }
            let take = rest.len().min(self.pad.len() - self.used);
            let (chunk, tail) = std::mem::take(&mut rest).split_at_mut(take);
            for (byte, key) in chunk.iter_mut().zip(&self.pad[self.used..]) {
                *byte ^= key;
            }
            self.used += take;
            rest = tail;
        }
        Ok(())
    }

    /// Bytes of keystream generated per nonce.
    pub fn pad_size(&self) -> usize {
        self.pad.len()
    }

    /// The nonce the next refill will use.
    pub fn nonce(&self) -> &Nonce<O> {
        &*self.nonce
    }
}

impl<O: StreamOp> fmt::Debug for Streamer<'_, '_, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Streamer")
            .field("operation", &O::OPERATION)
            .field("nonce", &self.nonce)
            .field("pad_size", &self.pad.len())
            .field("used", &self.used)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::ops;

    type Key = SecretKey<ops::Stream>;

    #[test]
    fn test_apply_twice_restores() {
        let key = Key::generate().unwrap();
        let start = Nonce::<ops::Stream>::generate().unwrap();
        let original: Vec<u8> = (0..1000u32).map(|i| i as u8).collect();

        let mut data = original.clone();
        let mut enc_nonce = start.clone();
        Streamer::with_pad_size(&key, &mut enc_nonce, 64)
            .unwrap()
            .apply(&mut data)
            .unwrap();
        assert_ne!(data, original);

        let mut dec_nonce = start.clone();
        Streamer::with_pad_size(&key, &mut dec_nonce, 64)
            .unwrap()
            .apply(&mut data)
            .unwrap();
        assert_eq!(data, original);
        assert_eq!(enc_nonce, dec_nonce);
    }

    #[test]
    fn test_chunking_does_not_matter() {
        let key = Key::generate().unwrap();
        let start = Nonce::<ops::Stream>::generate_constant().unwrap();

        let mut whole = vec![0u8; 300];
        let mut n1 = start.clone();
        Streamer::with_pad_size(&key, &mut n1, 100)
            .unwrap()
            .apply(&mut whole)
            .unwrap();

        let mut pieces = vec![0u8; 300];
        let mut n2 = start.clone();
        let mut streamer = Streamer::with_pad_size(&key, &mut n2, 100).unwrap();
        for chunk in pieces.chunks_mut(7) {
            streamer.apply(chunk).unwrap();
        }
        assert_eq!(whole, pieces);
    }

    #[test]
    fn test_nonce_advances_once_per_pad() {
        let key = Key::generate().unwrap();
        let mut nonce = Nonce::<ops::Stream>::generate_constant().unwrap();
        let mut streamer = Streamer::with_pad_size(&key, &mut nonce, 16).unwrap();
        streamer.apply(&mut [0u8; 16]).unwrap();
        assert_eq!(streamer.nonce().sequential(), &[0, 0, 0, 0, 0, 0, 0, 1]);
        streamer.apply(&mut [0u8; 17]).unwrap();
        assert_eq!(streamer.nonce().sequential(), &[0, 0, 0, 0, 0, 0, 0, 3]);
        streamer.apply(&mut [0u8; 0]).unwrap();
        assert_eq!(streamer.nonce().sequential(), &[0, 0, 0, 0, 0, 0, 0, 3]);
    }

    #[test]
    fn test_zero_pad_rejected() {
        let key = Key::generate().unwrap();
        let mut nonce = Nonce::<ops::Stream>::generate().unwrap();
        assert!(Streamer::with_pad_size(&key, &mut nonce, 0).is_err());
        assert_eq!(Streamer::new(&key, &mut nonce).unwrap().pad_size(), default_pad_size());
        assert!(set_default_pad_size(0).is_err());
    }

    #[test]
    fn test_ietf_variant() {
        let key = SecretKey::<ops::StreamChacha20Ietf>::generate().unwrap();
        let mut nonce = Nonce::<ops::StreamChacha20Ietf>::generate().unwrap();
        let mut data = *b"plain text";
        Streamer::new(&key, &mut nonce).unwrap().apply(&mut data).unwrap();
        assert_ne!(&data, b"plain text");
    }

    #[test]
    fn test_overflow_leaves_data_untouched() {
        let key = Key::generate().unwrap();
        let mut raw = [7u8; 24];
        raw[23] = 0xFE;
        let mut nonce = Nonce::<ops::Stream>::from_slice_sized(&raw, 1).unwrap();
        let mut streamer = Streamer::with_pad_size(&key, &mut nonce, 8).unwrap();

        // One refill fits, a second would wrap the counter
        let mut data = [0u8; 9];
        assert!(matches!(streamer.apply(&mut data), Err(CryptoError::Overflow)));
        assert_eq!(data, [0u8; 9]);
        assert_eq!(streamer.nonce().sequential(), &[0xFE]);
        assert!(!streamer.nonce().is_overflowed());

        let mut data = [0u8; 8];
        streamer.apply(&mut data).unwrap();
        assert_ne!(data, [0u8; 8]);
        assert_eq!(streamer.nonce().sequential(), &[0xFF]);
    }
}
