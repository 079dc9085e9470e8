//! Ed25519 point-decompression check.
//!
//! A 32-byte string is "on curve" when it decodes to a point on the twisted
//! Edwards curve `-x^2 + y^2 = 1 + d*x^2*y^2` over `GF(2^255 - 19)`. Program
//! derived addresses must fail this check so that no private key exists for
//! them.
//!
//! The decoding follows RFC 8032 section 5.1.3 with plain big-integer
//! arithmetic. The curve constants are computed once and shared read-only.

use std::sync::OnceLock;

use num_bigint::BigUint;
use num_traits::One;

struct FieldConstants {
    /// The field prime `2^255 - 19`.
    p: BigUint,
    /// `-121665 / 121666 mod p`.
    d: BigUint,
    /// Square root of -1: `2^((p - 1) / 4) mod p`.
    sqrt_m1: BigUint,
    /// `(p + 3) / 8`, the candidate square-root exponent.
    sqrt_exp: BigUint,
    /// `p - 2`, the Fermat inversion exponent.
    inv_exp: BigUint,
}

fn field() -> &'static FieldConstants {
    static FIELD: OnceLock<FieldConstants> = OnceLock::new();
    FIELD.get_or_init(|| {
        let p: BigUint = (BigUint::one() << 255usize) - 19u32;
        let inv_exp = &p - 2u32;
        let sqrt_exp: BigUint = (&p + 3u32) >> 3usize;

        let inv_121666 = BigUint::from(121_666u32).modpow(&inv_exp, &p);
        let d = (&p - 121_665u32) * inv_121666 % &p;
        let sqrt_m1 = BigUint::from(2u32).modpow(&((&p - 1u32) >> 2usize), &p);

        FieldConstants {
            p,
            d,
            sqrt_m1,
            sqrt_exp,
            inv_exp,
        }
    })
}

/// Returns true if `bytes` is the compressed encoding of an ed25519 point.
pub fn is_on_curve(bytes: &[u8; 32]) -> bool {
    let f = field();

    let sign = bytes[31] & 0x80 != 0;
    let mut y_bytes = *bytes;
    y_bytes[31] &= 0x7f;
    let y = BigUint::from_bytes_le(&y_bytes);

    let mut x = recover_x(&y, f);
    if x.bit(0) != sign {
        x = &f.p - &x;
    }

    satisfies_curve(&x, &y, f)
}

/// Candidate x for `y`, normalized to the even root. Only meaningful if the
/// curve equation holds afterwards.
fn recover_x(y: &BigUint, f: &FieldConstants) -> BigUint {
    let p = &f.p;
    let yy = y * y % p;

    // xx = (y^2 - 1) / (d*y^2 + 1)
    let u = (&yy + p - 1u32) % p;
    let v = (&f.d * &yy + 1u32) % p;
    let xx = u * v.modpow(&f.inv_exp, p) % p;

    let mut x = xx.modpow(&f.sqrt_exp, p);
    if &x * &x % p != xx {
        x = x * &f.sqrt_m1 % p;
    }
    if x.bit(0) {
        x = p - x;
    }
    x
}

fn satisfies_curve(x: &BigUint, y: &BigUint, f: &FieldConstants) -> bool {
    let p = &f.p;
    let xx = x * x % p;
    let yy = y * y % p;

    // -x^2 + y^2 == 1 + d*x^2*y^2
    let lhs = (&yy + p - &xx) % p;
    let rhs = (&f.d * &xx % p * &yy + 1u32) % p;
    lhs == rhs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(address: &str) -> [u8; 32] {
        bs58::decode(address)
            .into_vec()
            .unwrap()
            .try_into()
            .unwrap()
    }

    fn dalek_on_curve(bytes: &[u8; 32]) -> bool {
        curve25519_dalek::edwards::CompressedEdwardsY(*bytes)
            .decompress()
            .is_some()
    }

    // -- known vectors ------------------------------------------------------

    #[test]
    fn known_on_curve_key() {
        let bytes = decode("4fwsi7ei2vDcUByZWXV3YmMEyLwBnLamiuDzUrEKADnm");
        assert!(is_on_curve(&bytes));
    }

    #[test]
    fn known_off_curve_address() {
        let bytes = decode("12rqwuEgBYiGhBrDJStCiqEtzQpTTiZbh7teNVLuYcFA");
        assert!(!is_on_curve(&bytes));
    }

    #[test]
    fn basepoint_is_on_curve() {
        let mut basepoint = [0x66u8; 32];
        basepoint[0] = 0x58;
        assert!(is_on_curve(&basepoint));
    }

    #[test]
    fn identity_is_on_curve() {
        // (0, 1) is the neutral element.
        let mut identity = [0u8; 32];
        identity[0] = 1;
        assert!(is_on_curve(&identity));
    }

    #[test]
    fn repeated_0x02_is_off_curve() {
        assert!(!is_on_curve(&[0x02; 32]));
    }

    #[test]
    fn field_constants() {
        let f = field();
        // I^2 == -1
        assert_eq!(&f.sqrt_m1 * &f.sqrt_m1 % &f.p, &f.p - 1u32);
        // d * 121666 == -121665
        assert_eq!(
            &f.d * BigUint::from(121_666u32) % &f.p,
            &f.p - 121_665u32
        );
    }

    // -- agreement with curve25519-dalek -------------------------------------

    #[test]
    fn agrees_with_dalek_on_random_bytes() {
        use rand::RngCore;

        let mut rng = rand::thread_rng();
        let mut on = 0;
        for _ in 0..500 {
            let mut bytes = [0u8; 32];
            rng.fill_bytes(&mut bytes);
            let ours = is_on_curve(&bytes);
            assert_eq!(ours, dalek_on_curve(&bytes), "mismatch for {bytes:02x?}");
            if ours {
                on += 1;
            }
        }
        // Roughly half of all 32-byte strings decode to a point.
        assert!(on > 150 && on < 350, "on-curve count {on} out of range");
    }

    #[test]
    fn real_public_keys_are_on_curve() {
        for seed in [[1u8; 32], [8u8; 32], [0x42u8; 32]] {
            let key = ed25519_dalek::SigningKey::from_bytes(&seed);
            assert!(is_on_curve(&key.verifying_key().to_bytes()));
        }
    }

    #[test]
    fn deterministic() {
        let bytes = decode("4fwsi7ei2vDcUByZWXV3YmMEyLwBnLamiuDzUrEKADnm");
        assert_eq!(is_on_curve(&bytes), is_on_curve(&bytes));
    }
}
