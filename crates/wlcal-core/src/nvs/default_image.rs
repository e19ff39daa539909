//! Built-in NVS image, used when neither the calibration store nor the
//! firmware directory supplies one.
//!
//! The first four bytes are the reserved length/sequence prefix. The
//! power-limit bytes at 337/340/377/380 carry the ETSI values that the US
//! patch replaces.

use super::NVS_IMAGE_LEN;

pub const DEFAULT_NVS: [u8; NVS_IMAGE_LEN] = [
    0x00, 0x00, 0x00, 0x00, 0x01, 0x6c, 0x54, 0x00, 0x00, 0x00, 0x00, 0x01,
    0x70, 0x54, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x5e, 0x01, 0x00, 0x00,
    0x00, 0x01, 0x04, 0x5e, 0x20, 0x03, 0x00, 0x00, 0x07, 0x03, 0xd0, 0x02,
    0x1c, 0x00, 0x02, 0x04, 0x1f, 0x0a, 0x08, 0x10, 0x05, 0x00, 0x19, 0x14,
    0x30, 0x32, 0x34, 0x36, 0x38, 0x3a, 0x3c, 0x3e, 0x40, 0x42, 0x1a, 0x1b,
    0x1c, 0x1d, 0x1e, 0x1f, 0x20, 0x21, 0x22, 0x23, 0x2f, 0x31, 0x33, 0x35,
    0x37, 0x39, 0x3b, 0x3d, 0x3f, 0x41, 0x1b, 0x1c, 0x1d, 0x1e, 0x1f, 0x20,
    0x21, 0x22, 0x23, 0x24, 0x2e, 0x30, 0x32, 0x34, 0x36, 0x38, 0x3a, 0x3c,
    0x3e, 0x40, 0x1c, 0x1d, 0x1e, 0x1f, 0x20, 0x21, 0x22, 0x23, 0x24, 0x25,
    0x2d, 0x2f, 0x31, 0x33, 0x35, 0x37, 0x39, 0x3b, 0x3d, 0x3f, 0x1d, 0x1e,
    0x1f, 0x20, 0x21, 0x22, 0x23, 0x24, 0x25, 0x26, 0x2c, 0x2e, 0x30, 0x32,
    0x34, 0x36, 0x38, 0x3a, 0x3c, 0x3e, 0x1e, 0x1f, 0x20, 0x21, 0x22, 0x23,
    0x24, 0x25, 0x26, 0x27, 0x2b, 0x2d, 0x2f, 0x31, 0x33, 0x35, 0x37, 0x39,
    0x3b, 0x3d, 0x1f, 0x20, 0x21, 0x22, 0x23, 0x24, 0x25, 0x26, 0x27, 0x28,
    0x2a, 0x2c, 0x2e, 0x30, 0x32, 0x34, 0x36, 0x38, 0x3a, 0x3c, 0x20, 0x21,
    0x22, 0x23, 0x24, 0x25, 0x26, 0x27, 0x28, 0x29, 0x29, 0x2b, 0x2d, 0x2f,
    0x31, 0x33, 0x35, 0x37, 0x39, 0x3b, 0x21, 0x22, 0x23, 0x24, 0x25, 0x26,
    0x27, 0x28, 0x29, 0x2a, 0x28, 0x2a, 0x2c, 0x2e, 0x30, 0x32, 0x34, 0x36,
    0x38, 0x3a, 0x22, 0x23, 0x24, 0x25, 0x26, 0x27, 0x28, 0x29, 0x2a, 0x2b,
    0x27, 0x29, 0x2b, 0x2d, 0x2f, 0x31, 0x33, 0x35, 0x37, 0x39, 0x23, 0x24,
    0x25, 0x26, 0x27, 0x28, 0x29, 0x2a, 0x2b, 0x2c, 0x26, 0x28, 0x2a, 0x2c,
    0x2e, 0x30, 0x32, 0x34, 0x36, 0x38, 0x24, 0x25, 0x26, 0x27, 0x28, 0x29,
    0x2a, 0x2b, 0x2c, 0x2d, 0x25, 0x27, 0x29, 0x2b, 0x2d, 0x2f, 0x31, 0x33,
    0x35, 0x37, 0x25, 0x26, 0x27, 0x28, 0x29, 0x2a, 0x2b, 0x2c, 0x2d, 0x2e,
    0x24, 0x26, 0x28, 0x2a, 0x2c, 0x2e, 0x30, 0x32, 0x34, 0x36, 0x26, 0x27,
    0x0c, 0x0a, 0x08, 0x06, 0x0c, 0x0a, 0x08, 0x06, 0x0c, 0x0a, 0x08, 0x06,
    0x0c, 0x0a, 0x08, 0x06, 0x0c, 0x0a, 0x08, 0x06, 0x0c, 0x0a, 0x08, 0x06,
    0x0c, 0x0a, 0x08, 0x06, 0x0c, 0x0a, 0x08, 0x06, 0x0c, 0x0a, 0x08, 0x06,
    0x0c, 0x01, 0x08, 0x06, 0x07, 0x0a, 0x08, 0x06, 0x0c, 0x0a, 0x08, 0x06,
    0x0c, 0x0a, 0x08, 0x06, 0x0c, 0x0a, 0x08, 0x06, 0x0c, 0x0a, 0x08, 0x06,
    0x0c, 0x0a, 0x08, 0x06, 0x0c, 0x0a, 0x08, 0x06, 0x0c, 0x0a, 0x08, 0x06,
    0x0c, 0x0a, 0x08, 0x06, 0x0c, 0x01, 0x08, 0x06, 0x07, 0x0a, 0x08, 0x06,
    0x0c, 0x0a, 0x08, 0x06, 0x0c, 0x0a, 0x08, 0x06, 0x0c, 0x0a, 0x08, 0x06,
    0x0c, 0x0a, 0x08, 0x06, 0x0c, 0x0a, 0x08, 0x06, 0x0c, 0x0a, 0x08, 0x06,
    0x0c, 0x0a, 0x08, 0x06, 0x0c, 0x0a, 0x08, 0x06, 0x0c, 0x0a, 0x08, 0x06,
    0x84, 0x7b, 0x89, 0x80, 0x77, 0x85, 0x7c, 0x8a, 0x81, 0x78, 0x86, 0x7d,
    0x8b, 0x82, 0x79, 0x87, 0x7e, 0x75, 0x83, 0x7a, 0x88, 0x7f, 0x76, 0x84,
    0x7b, 0x89, 0x80, 0x77, 0x85, 0x7c, 0x8a, 0x81, 0x78, 0x86, 0x7d, 0x8b,
    0x82, 0x79, 0x87, 0x7e, 0x75, 0x83, 0x7a, 0x88, 0x7f, 0x76, 0x84, 0x7b,
    0x89, 0x80, 0x77, 0x85, 0x7c, 0x8a, 0x81, 0x78, 0x86, 0x7d, 0x8b, 0x82,
    0x79, 0x87, 0x7e, 0x75, 0x83, 0x7a, 0x88, 0x7f, 0x76, 0x84, 0x7b, 0x89,
    0x80, 0x77, 0x85, 0x7c, 0x8a, 0x81, 0x78, 0x86, 0x7d, 0x8b, 0x82, 0x79,
    0x87, 0x7e, 0x75, 0x83, 0x7a, 0x88, 0x7f, 0x76, 0x84, 0x7b, 0x89, 0x80,
    0x77, 0x85, 0x7c, 0x8a, 0x81, 0x78, 0x86, 0x7d, 0x8b, 0x82, 0x79, 0x87,
    0x7e, 0x75, 0x83, 0x7a, 0x88, 0x7f, 0x76, 0x84, 0x7b, 0x89, 0x80, 0x77,
    0x85, 0x7c, 0x8a, 0x81, 0x78, 0x86, 0x7d, 0x8b, 0x82, 0x79, 0x87, 0x7e,
    0x75, 0x83, 0x7a, 0x88, 0x7f, 0x76, 0x84, 0x7b, 0x89, 0x80, 0x77, 0x85,
    0x7c, 0x8a, 0x81, 0x78, 0x86, 0x7d, 0x8b, 0x82, 0x79, 0x87, 0x7e, 0x75,
    0x83, 0x7a, 0x88, 0x7f, 0x76, 0x84, 0x7b, 0x89, 0x80, 0x77, 0x85, 0x7c,
    0x8a, 0x81, 0x78, 0x86, 0x7d, 0x8b, 0x82, 0x79, 0x87, 0x7e, 0x75, 0x83,
    0x7a, 0x88, 0x7f, 0x76, 0x84, 0x7b, 0x89, 0x80, 0x77, 0x85, 0x7c, 0x8a,
    0x81, 0x78, 0x86, 0x7d, 0x8b, 0x82, 0x79, 0x87, 0x7e, 0x75, 0x83, 0x7a,
    0x88, 0x7f, 0x76, 0x84, 0x7b, 0x89, 0x80, 0x77, 0x85, 0x7c, 0x8a, 0x81,
    0x78, 0x86, 0x7d, 0x8b, 0x82, 0x79, 0x87, 0x7e, 0x75, 0x83, 0x7a, 0x88,
    0x7f, 0x76, 0x84, 0x7b, 0x89, 0x80, 0x77, 0x85, 0x7c, 0x8a, 0x81, 0x78,
    0x86, 0x7d, 0x8b, 0x82, 0x79, 0x87, 0x7e, 0x75, 0x83, 0x7a, 0x88, 0x7f,
    0x76, 0x84, 0x7b, 0x89, 0x80, 0x77, 0x85, 0x7c, 0x8a, 0x81, 0x78, 0x86,
    0x7d, 0x8b, 0x82, 0x79, 0x87, 0x7e, 0x75, 0x83, 0x7a, 0x88, 0x7f, 0x76,
    0x84, 0x7b, 0x89, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];
