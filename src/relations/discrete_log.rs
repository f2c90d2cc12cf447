//! Knowledge of a discrete logarithm with a one-bit challenge.
//!
//! The prover knows `x` with `y = g^x (mod p)` in a subgroup of prime order `q`.
//! Each round it commits to `t = g^k` for a fresh `k`. On `Left` it opens `k`
//! (checked as `g^k = t`), on `Right` it opens `s = k + x (mod q)` (checked as
//! `g^s = t * y`). Either opening alone is uniformly distributed and reveals
//! nothing about `x`; both together would give `x = s - k`.

use std::fmt;
use std::sync::Arc;

use num_bigint::{BigUint, RandBigInt};
use rand_core::CryptoRngCore;

use super::KnownPublicKey;
use crate::protocol::{ProverHelper, VerifierHelper};
use crate::{Error, PrivateKey, PublicKeyGenerator, Result, SecureRng};

/// A prime-order subgroup of `Z_p^*` with generator `g`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DlogGroup {
    p: BigUint,
    q: BigUint,
    g: BigUint,
}

impl DlogGroup {
    /// Creates a group after checking that `g` generates a subgroup of order `q`.
    pub fn new(p: BigUint, q: BigUint, g: BigUint) -> Result<Self> {
        let zero = BigUint::from(0u32);
        let one = BigUint::from(1u32);

        if p <= BigUint::from(3u32) || !is_probable_prime(&p) {
            return Err(Error::InvalidParams("Modulus p must be an odd prime".to_string()));
        }

        if !is_probable_prime(&q) || (&p - &one) % &q != zero {
            return Err(Error::InvalidParams("Order q must be a prime dividing p - 1".to_string()));
        }

        if g <= one || g >= p {
            return Err(Error::InvalidParams(
                "Generator must lie strictly between 1 and p".to_string(),
            ));
        }

        if g.modpow(&q, &p) != one {
            return Err(Error::InvalidParams("Generator does not have order q".to_string()));
        }

        Ok(Self { p, q, g })
    }

    /// RFC 5114 2048-bit MODP group with a 256-bit prime-order subgroup.
    pub fn rfc5114() -> Self {
        Self {
            p: hex_to_biguint(RFC5114_P),
            q: hex_to_biguint(RFC5114_Q),
            g: hex_to_biguint(RFC5114_G),
        }
    }

    /// Tiny group (`p = 23`, `q = 11`, `g = 4`) for tests and demonstrations.
    pub fn toy() -> Self {
        Self {
            p: BigUint::from(23u32),
            q: BigUint::from(11u32),
            g: BigUint::from(4u32),
        }
    }

    /// Modulus.
    pub fn p(&self) -> &BigUint {
        &self.p
    }

    /// Subgroup order.
    pub fn q(&self) -> &BigUint {
        &self.q
    }

    /// Generator.
    pub fn g(&self) -> &BigUint {
        &self.g
    }

    /// `g^e (mod p)`.
    pub fn pow(&self, e: &BigUint) -> BigUint {
        self.g.modpow(e, &self.p)
    }

    /// Uniform exponent in `[1, q)`.
    pub fn random_exponent<R: CryptoRngCore + ?Sized>(&self, rng: &mut R) -> BigUint {
        rng.gen_biguint_range(&BigUint::from(1u32), &self.q)
    }

    /// Whether `value` is a non-identity element of the subgroup.
    pub fn contains(&self, value: &BigUint) -> bool {
        let one = BigUint::from(1u32);
        *value > one && *value < self.p && value.modpow(&self.q, &self.p) == one
    }

    fn mul(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a * b) % &self.p
    }

    fn invert(&self, a: &BigUint) -> BigUint {
        let exp = &self.p - BigUint::from(2u32);
        a.modpow(&exp, &self.p)
    }
}

/// Secret exponent `x`.
#[derive(Clone)]
pub struct DlogSecret {
    group: Arc<DlogGroup>,
    x: BigUint,
}

impl DlogSecret {
    /// Wraps a known exponent.
    pub fn new(group: Arc<DlogGroup>, x: BigUint) -> Self {
        Self { group, x }
    }

    /// Draws a fresh secret exponent.
    pub fn random<R: CryptoRngCore + ?Sized>(group: Arc<DlogGroup>, rng: &mut R) -> Self {
        let x = group.random_exponent(rng);
        Self { group, x }
    }

    /// Group the secret lives in.
    pub fn group(&self) -> &Arc<DlogGroup> {
        &self.group
    }
}

impl fmt::Debug for DlogSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DlogSecret").finish_non_exhaustive()
    }
}

impl PublicKeyGenerator for DlogSecret {
    type PublicKey = DlogPublicKey;

    /// Yields no key for an exponent outside `[1, q)`.
    fn generate(&self) -> Option<DlogPublicKey> {
        if self.x == BigUint::from(0u32) || self.x >= self.group.q {
            return None;
        }

        Some(DlogPublicKey {
            y: self.group.pow(&self.x),
        })
    }
}

/// Public value `y = g^x`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DlogPublicKey {
    y: BigUint,
}

impl DlogPublicKey {
    /// Wraps a public value received from elsewhere.
    pub fn new(y: BigUint) -> Self {
        Self { y }
    }

    /// The public value.
    pub fn y(&self) -> &BigUint {
        &self.y
    }
}

impl fmt::Display for DlogPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.y.to_bytes_be()))
    }
}

/// Round commitment `t`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DlogCommitment {
    t: BigUint,
}

impl DlogCommitment {
    /// The committed group element.
    pub fn t(&self) -> &BigUint {
        &self.t
    }
}

impl fmt::Display for DlogCommitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.t.to_bytes_be()))
    }
}

/// Round opening `s`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DlogResponse {
    s: BigUint,
}

impl DlogResponse {
    /// Wraps an opening, e.g. one received over a transport.
    pub fn new(s: BigUint) -> Self {
        Self { s }
    }

    /// The opened exponent.
    pub fn s(&self) -> &BigUint {
        &self.s
    }
}

impl fmt::Display for DlogResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.s.to_bytes_be()))
    }
}

/// Honest prover strategy.
#[derive(Clone, Default)]
pub struct DlogProver {
    nonce: Option<BigUint>,
    rng: SecureRng,
}

impl DlogProver {
    /// Creates a prover strategy with no open round.
    pub fn new() -> Self {
        Self::default()
    }

    fn nonce(&self) -> BigUint {
        // An unopened round answers with zero, which never verifies against a
        // non-identity commitment.
        self.nonce.clone().unwrap_or_default()
    }
}

impl ProverHelper for DlogProver {
    type Key = DlogSecret;
    type Proof = DlogCommitment;
    type Response = DlogResponse;

    fn generate(&mut self, key: &PrivateKey<DlogSecret>) -> DlogCommitment {
        let group = key.generator().group();
        let k = group.random_exponent(&mut self.rng);
        let t = group.pow(&k);
        self.nonce = Some(k);
        DlogCommitment { t }
    }

    fn left(&mut self, _key: &PrivateKey<DlogSecret>) -> DlogResponse {
        DlogResponse { s: self.nonce() }
    }

    fn right(&mut self, key: &PrivateKey<DlogSecret>) -> DlogResponse {
        let secret = key.generator();
        let s = (self.nonce() + &secret.x) % secret.group.q();
        DlogResponse { s }
    }
}

/// Verifier strategy.
#[derive(Clone, Debug)]
pub struct DlogVerifier {
    group: Arc<DlogGroup>,
}

impl DlogVerifier {
    /// Creates a verifier strategy for `group`.
    pub fn new(group: Arc<DlogGroup>) -> Self {
        Self { group }
    }

    fn well_formed(
        &self,
        public_key: &DlogPublicKey,
        proof: &DlogCommitment,
        response: &DlogResponse,
    ) -> bool {
        self.group.contains(&public_key.y)
            && self.group.contains(&proof.t)
            && response.s < self.group.q
    }
}

impl VerifierHelper for DlogVerifier {
    type PublicKey = DlogPublicKey;
    type Proof = DlogCommitment;
    type Response = DlogResponse;

    fn left(
        &self,
        public_key: &DlogPublicKey,
        proof: &DlogCommitment,
        response: &DlogResponse,
    ) -> bool {
        self.well_formed(public_key, proof, response) && self.group.pow(&response.s) == proof.t
    }

    fn right(
        &self,
        public_key: &DlogPublicKey,
        proof: &DlogCommitment,
        response: &DlogResponse,
    ) -> bool {
        self.well_formed(public_key, proof, response)
            && self.group.pow(&response.s) == self.group.mul(&proof.t, &public_key.y)
    }
}

/// Impersonator that knows `y` but not `x`.
///
/// Each round it bets on one challenge and builds a commitment it can open for
/// that branch only: `t = g^s` for `Left`, `t = g^s * y^-1` for `Right`.
#[derive(Clone)]
pub struct CheatingDlogProver {
    group: Arc<DlogGroup>,
    bet_left: bool,
    s: BigUint,
    rng: SecureRng,
}

impl CheatingDlogProver {
    /// Creates an impersonator for `group`.
    pub fn new(group: Arc<DlogGroup>) -> Self {
        Self {
            group,
            bet_left: true,
            s: BigUint::default(),
            rng: SecureRng::default(),
        }
    }

    fn opening(&mut self, left: bool) -> DlogResponse {
        if left == self.bet_left {
            DlogResponse { s: self.s.clone() }
        } else {
            DlogResponse {
                s: self.group.random_exponent(&mut self.rng),
            }
        }
    }
}

impl ProverHelper for CheatingDlogProver {
    type Key = KnownPublicKey<DlogPublicKey>;
    type Proof = DlogCommitment;
    type Response = DlogResponse;

    fn generate(&mut self, key: &PrivateKey<Self::Key>) -> DlogCommitment {
        let mut bit = [0u8; 1];
        rand_core::RngCore::fill_bytes(&mut self.rng, &mut bit);
        self.bet_left = bit[0] & 1 == 0;
        self.s = self.group.random_exponent(&mut self.rng);

        let gs = self.group.pow(&self.s);
        let t = if self.bet_left {
            gs
        } else {
            self.group.mul(&gs, &self.group.invert(&key.generator().0.y))
        };
        DlogCommitment { t }
    }

    fn left(&mut self, _key: &PrivateKey<Self::Key>) -> DlogResponse {
        self.opening(true)
    }

    fn right(&mut self, _key: &PrivateKey<Self::Key>) -> DlogResponse {
        self.opening(false)
    }
}

/// Miller-Rabin with random bases; a composite survives with probability at
/// most `4^-MILLER_RABIN_ROUNDS`.
fn is_probable_prime(n: &BigUint) -> bool {
    let zero = BigUint::from(0u32);
    let one = BigUint::from(1u32);
    let two = BigUint::from(2u32);

    if *n < two {
        return false;
    }
    for small in SMALL_PRIMES {
        if *n == BigUint::from(small) {
            return true;
        }
        if n % small == zero {
            return false;
        }
    }

    let n_minus_one = n - &one;
    let s = n_minus_one.trailing_zeros().unwrap_or(0);
    let d = &n_minus_one >> s;
    let mut rng = SecureRng::default();

    'witness: for _ in 0..MILLER_RABIN_ROUNDS {
        let a = rng.gen_biguint_range(&two, &n_minus_one);
        let mut x = a.modpow(&d, n);
        if x == one || x == n_minus_one {
            continue;
        }
        for _ in 1..s {
            x = x.modpow(&two, n);
            if x == n_minus_one {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

const SMALL_PRIMES: [u32; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

const MILLER_RABIN_ROUNDS: usize = 20;

fn hex_to_biguint(hex: &str) -> BigUint {
    BigUint::parse_bytes(hex.as_bytes(), 16)
        .unwrap_or_else(|| unreachable!("RFC 5114 constants are valid hex"))
}

const RFC5114_P: &str = "87A8E61DB4B6663CFFBBD19C651959998CEEF608660DD0F25D2CEED4435E3B00E00DF8F1D61957D4FAF7DF4561B2AA3016C3D91134096FAA3BF4296D830E9A7C209E0C6497517ABD5A8A9D306BCF67ED91F9E6725B4758C022E0B1EF4275BF7B6C5BFC11D45F9088B941F54EB1E59BB8BC39A0BF12307F5C4FDB70C581B23F76B63ACAE1CAA6B7902D52526735488A0EF13C6D9A51BFA4AB3AD8347796524D8EF6A167B5A41825D967E144E5140564251CCACB83E6B486F6B3CA3F7971506026C0B857F689962856DED4010ABD0BE621C3A3960A54E710C375F26375D7014103A4B54330C198AF126116D2276E11715F693877FAD7EF09CADB094AE91E1A1597";

const RFC5114_Q: &str = "8CF83642A709A097B447997640129DA299B1A47D1EB3750BA308B0FE64F5FBD3";

const RFC5114_G: &str = "3FB32C9B73134D0B2E77506660EDBD484CA7B18F21EF205407F4793A1A0BA12510DBC15077BE463FFF4FED4AAC0BB555BE3A6C1B0C6B47B1BC3773BF7E8C6F62901228F8C28CBB18A55AE31341000A650196F931C77A57F2DDF463E5E9EC144B777DE62AAAB8A8628AC376D282D6ED3864E67982428EBC831D14348F6F2F9193B5045AF2767164E1DFC967C1FB3F2E55A4BD1BFFE83B9C80D052B985D182EA0ADB2A3B7313D3FE14C8484B1E052588B9B7D2BBD2DF016199ECD06E1557CD0915B3353BBB64E0EC377FD028370DF92B52C7891428CDC67EB6184B523D1DB246C32F63078490F00EF8D647D148D47954515E2327CFEF98C582664B4C0F6CC41659";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Challenge;
    use crate::protocol::{Prover, Verifier};

    fn toy_key(x: u32) -> (Arc<DlogGroup>, Arc<PrivateKey<DlogSecret>>) {
        let group = Arc::new(DlogGroup::toy());
        let secret = DlogSecret::new(Arc::clone(&group), BigUint::from(x));
        (group, Arc::new(PrivateKey::with_generator(secret)))
    }

    #[test]
    fn toy_group_is_valid() {
        let toy = DlogGroup::toy();
        let checked = DlogGroup::new(toy.p().clone(), toy.q().clone(), toy.g().clone()).unwrap();
        assert_eq!(checked, toy);
    }

    #[test]
    fn rfc5114_group_is_valid() {
        let group = DlogGroup::rfc5114();
        assert!(DlogGroup::new(group.p().clone(), group.q().clone(), group.g().clone()).is_ok());
        assert_eq!(group.q().bits(), 256);
    }

    #[test]
    fn rejects_generator_of_wrong_order() {
        let result = DlogGroup::new(
            BigUint::from(23u32),
            BigUint::from(11u32),
            BigUint::from(5u32),
        );
        assert!(matches!(result, Err(Error::InvalidParams(_))));
    }

    #[test]
    fn rejects_composite_modulus() {
        // 18^3 = 1 (mod 49), so only the primality check catches this.
        let result = DlogGroup::new(
            BigUint::from(49u32),
            BigUint::from(3u32),
            BigUint::from(18u32),
        );
        assert!(matches!(result, Err(Error::InvalidParams(_))));
    }

    #[test]
    fn rejects_composite_order() {
        // 5 generates all of Z_23^*, which has composite order 22.
        let result = DlogGroup::new(
            BigUint::from(23u32),
            BigUint::from(22u32),
            BigUint::from(5u32),
        );
        assert!(matches!(result, Err(Error::InvalidParams(_))));
    }

    #[test]
    fn primality_check() {
        let primes = [2u32, 3, 37, 41, 7919, 104_729];
        let composites = [0u32, 1, 4, 49, 561, 1_373_653, 41 * 43];
        for n in primes {
            assert!(is_probable_prime(&BigUint::from(n)), "{n} is prime");
        }
        for n in composites {
            assert!(!is_probable_prime(&BigUint::from(n)), "{n} is composite");
        }
    }

    #[test]
    fn rejects_order_not_dividing_p_minus_one() {
        let result = DlogGroup::new(BigUint::from(23u32), BigUint::from(7u32), BigUint::from(4u32));
        assert!(result.is_err());
    }

    #[test]
    fn public_key_matches_small_example() {
        // 4^6 mod 23 = 2
        let (_, key) = toy_key(6);
        assert_eq!(key.public_key().unwrap().y(), &BigUint::from(2u32));
    }

    #[test]
    fn out_of_range_secret_yields_no_key() {
        let (_, key) = toy_key(11);
        assert!(matches!(key.public_key(), Err(Error::Construction(_))));
    }

    #[test]
    fn honest_openings_verify_for_both_challenges() {
        let (group, key) = toy_key(6);
        let public_key = Arc::new(key.public_key().unwrap().clone());
        let helper = Arc::new(DlogVerifier::new(group));

        for challenge in [Challenge::Left, Challenge::Right] {
            let mut prover = Prover::new(Arc::clone(&key), DlogProver::new());
            let proof = prover.construct_proof();
            let response = prover.respond(challenge);

            let ok = match challenge {
                Challenge::Left => helper.left(&public_key, &proof, &response),
                Challenge::Right => helper.right(&public_key, &proof, &response),
            };
            assert!(ok, "{challenge} opening rejected");
        }
    }

    #[test]
    fn primitive_round_trip_on_rfc5114() {
        let group = Arc::new(DlogGroup::rfc5114());
        let mut rng = SecureRng::default();
        let key = Arc::new(PrivateKey::with_generator(DlogSecret::random(
            Arc::clone(&group),
            &mut rng,
        )));
        let public_key = Arc::new(key.public_key().unwrap().clone());
        let helper = Arc::new(DlogVerifier::new(group));

        for _ in 0..4 {
            let mut prover = Prover::new(Arc::clone(&key), DlogProver::new());
            let proof = prover.construct_proof();
            let verifier = Verifier::new(
                Arc::clone(&public_key),
                proof.clone(),
                Arc::clone(&helper),
                &mut rng,
            )
            .unwrap();
            assert_eq!(verifier.proof(), &proof);
            let response = prover.respond(verifier.challenge());
            assert!(verifier.verify(&response));
        }
    }

    #[test]
    fn swapped_openings_are_rejected() {
        let (group, key) = toy_key(6);
        let public_key = key.public_key().unwrap().clone();
        let helper = DlogVerifier::new(group);

        let mut prover = Prover::new(Arc::clone(&key), DlogProver::new());
        let proof = prover.construct_proof();
        let left = prover.respond(Challenge::Left);
        let right = prover.respond(Challenge::Right);

        assert!(!helper.right(&public_key, &proof, &left));
        assert!(!helper.left(&public_key, &proof, &right));
    }

    #[test]
    fn out_of_range_response_is_rejected() {
        let (group, key) = toy_key(6);
        let public_key = key.public_key().unwrap().clone();
        let helper = DlogVerifier::new(Arc::clone(&group));

        let mut prover = Prover::new(Arc::clone(&key), DlogProver::new());
        let proof = prover.construct_proof();
        let honest = prover.respond(Challenge::Left);
        let shifted = DlogResponse::new(honest.s() + group.q());

        assert!(helper.left(&public_key, &proof, &honest));
        assert!(!helper.left(&public_key, &proof, &shifted));
    }

    #[test]
    fn cheater_opens_only_its_bet() {
        let group = Arc::new(DlogGroup::rfc5114());
        let mut rng = SecureRng::default();
        let secret = DlogSecret::random(Arc::clone(&group), &mut rng);
        let public_key = secret.generate().unwrap();
        let helper = DlogVerifier::new(Arc::clone(&group));
        let key = PrivateKey::with_generator(KnownPublicKey(public_key.clone()));

        for _ in 0..8 {
            let mut cheater = CheatingDlogProver::new(Arc::clone(&group));
            let proof = cheater.generate(&key);
            let left = cheater.left(&key);
            let right = cheater.right(&key);

            let passes = [
                helper.left(&public_key, &proof, &left),
                helper.right(&public_key, &proof, &right),
            ];
            assert_eq!(passes.iter().filter(|ok| **ok).count(), 1);
        }
    }
}
