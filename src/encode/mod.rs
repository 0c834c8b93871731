//! Binary-to-text codecs: Z85 and hex

pub mod hex;
pub mod z85;

pub use self::hex::{bin_to_hex, hex_to_bin, hex_to_bin_into};
pub use self::z85::{
    bin_to_z85, is_safe_z85_bin_size, is_safe_z85_string_size, safe_bin_to_z85,
    safe_z85_bin_to_string_size, safe_z85_string_to_bin_size, safe_z85_to_bin,
    safe_z85_to_bin_into, smart_bin_to_z85, smart_z85_to_bin, smart_z85_to_bin_into,
    z85_bin_to_string_size, z85_pad_size, z85_to_bin, z85_to_bin_into,
};
