use crate::{IdError, IdResult};
use serde::{Deserialize, Serialize};

/// Alphabet used when settings do not override it.
pub const DEFAULT_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ1234567890";

/// Minimum public id length used by the published site.
pub const DEFAULT_MIN_LENGTH: usize = 10;

const DEFAULT_SEPARATORS: &str = "cfhistuCFHISTU";
const MIN_ALPHABET_LEN: usize = 16;
const SEPARATOR_RATIO: f64 = 3.5;
const GUARD_RATIO: usize = 12;

/// Per-namespace codec settings, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecSettings {
    /// Secret salt. Changing it invalidates every issued id.
    pub salt: String,

    /// Shortest id the encoder emits; shorter encodings are padded.
    #[serde(default = "default_min_length")]
    pub min_length: usize,

    /// Output alphabet. At least 16 distinct, non-whitespace characters.
    #[serde(default = "default_alphabet")]
    pub alphabet: String,
}

impl CodecSettings {
    pub fn new(salt: impl Into<String>, min_length: usize) -> Self {
        Self {
            salt: salt.into(),
            min_length,
            alphabet: default_alphabet(),
        }
    }
}

fn default_min_length() -> usize {
    DEFAULT_MIN_LENGTH
}

fn default_alphabet() -> String {
    DEFAULT_ALPHABET.to_string()
}

/// Salted bidirectional `u64` <-> string codec.
///
/// The alphabet is split into three disjoint sets at construction time:
/// digits (the shuffled working alphabet), separators between numbers, and
/// guards used for padding short ids. All three depend on the salt.
#[derive(Debug, Clone)]
pub struct OpaqueIdCodec {
    label: String,
    salt: Vec<char>,
    min_length: usize,
    alphabet: Vec<char>,
    separators: Vec<char>,
    guards: Vec<char>,
}

impl OpaqueIdCodec {
    /// Build a codec for `label` (used only in error messages).
    pub fn new(label: impl Into<String>, settings: &CodecSettings) -> IdResult<Self> {
        let label = label.into();
        if settings.salt.trim().is_empty() {
            return Err(IdError::Configuration(format!(
                "namespace '{label}' has no salt configured"
            )));
        }

        let mut unique: Vec<char> = Vec::new();
        for c in settings.alphabet.chars() {
            if c.is_whitespace() {
                return Err(IdError::Configuration(format!(
                    "namespace '{label}' alphabet contains whitespace"
                )));
            }
            if !unique.contains(&c) {
                unique.push(c);
            }
        }
        if unique.len() < MIN_ALPHABET_LEN {
            return Err(IdError::Configuration(format!(
                "namespace '{label}' alphabet needs at least {MIN_ALPHABET_LEN} unique characters, got {}",
                unique.len()
            )));
        }

        let salt: Vec<char> = settings.salt.chars().collect();
        let mut separators: Vec<char> = DEFAULT_SEPARATORS
            .chars()
            .filter(|c| unique.contains(c))
            .collect();
        let mut alphabet: Vec<char> = unique
            .into_iter()
            .filter(|c| !separators.contains(c))
            .collect();
        consistent_shuffle(&mut separators, &salt);

        if separators.is_empty() || alphabet.len() as f64 / separators.len() as f64 > SEPARATOR_RATIO
        {
            let wanted = (alphabet.len() as f64 / SEPARATOR_RATIO).ceil() as usize;
            if wanted > separators.len() {
                let diff = wanted - separators.len();
                separators.extend(alphabet.drain(..diff));
            }
        }

        consistent_shuffle(&mut alphabet, &salt);

        let guard_count = alphabet.len().div_ceil(GUARD_RATIO);
        let guards = if alphabet.len() < 3 {
            separators.drain(..guard_count).collect()
        } else {
            alphabet.drain(..guard_count).collect()
        };

        Ok(Self {
            label,
            salt,
            min_length: settings.min_length,
            alphabet,
            separators,
            guards,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Encode one key.
    pub fn encode(&self, value: u64) -> String {
        self.encode_many(&[value])
    }

    /// Decode a string produced by [`encode`](Self::encode) on this codec.
    pub fn decode(&self, id: &str) -> IdResult<u64> {
        match self.decode_many(id).as_deref() {
            Some([value]) => Ok(*value),
            _ => Err(IdError::invalid(&self.label, id)),
        }
    }

    /// Encode a tuple of keys into one id. Empty input encodes to "".
    pub fn encode_many(&self, values: &[u64]) -> String {
        if values.is_empty() {
            return String::new();
        }

        let mut alphabet = self.alphabet.clone();
        let values_hash: u64 = values
            .iter()
            .enumerate()
            .map(|(i, value)| value % (i as u64 + 100))
            .sum();
        let lottery = alphabet[(values_hash % alphabet.len() as u64) as usize];

        let mut out = vec![lottery];
        for (i, &value) in values.iter().enumerate() {
            let buffer = self.shuffle_buffer(lottery, &alphabet);
            consistent_shuffle(&mut alphabet, &buffer);

            let digits = to_alphabet(value, &alphabet);
            out.extend_from_slice(&digits);

            if i + 1 < values.len() {
                let char_code = digits[0] as u64 + i as u64;
                let extra = value % char_code;
                out.push(self.separators[(extra % self.separators.len() as u64) as usize]);
            }
        }

        if out.len() < self.min_length {
            let front = (values_hash + out[0] as u64) % self.guards.len() as u64;
            out.insert(0, self.guards[front as usize]);

            if out.len() < self.min_length {
                let back = (values_hash + out[2] as u64) % self.guards.len() as u64;
                out.push(self.guards[back as usize]);
            }
        }

        let half = alphabet.len() / 2;
        while out.len() < self.min_length {
            let salt = alphabet.clone();
            consistent_shuffle(&mut alphabet, &salt);

            let mut padded = Vec::with_capacity(out.len() + alphabet.len());
            padded.extend_from_slice(&alphabet[half..]);
            padded.extend_from_slice(&out);
            padded.extend_from_slice(&alphabet[..half]);
            out = padded;

            if out.len() > self.min_length {
                let start = (out.len() - self.min_length) / 2;
                out = out[start..start + self.min_length].to_vec();
            }
        }

        out.into_iter().collect()
    }

    /// Decode an id into its key tuple. `None` unless re-encoding the result
    /// reproduces `id` exactly.
    pub fn decode_many(&self, id: &str) -> Option<Vec<u64>> {
        if id.is_empty() || !id.chars().all(|c| self.is_known(c)) {
            return None;
        }

        let parts: Vec<&str> = id.split(|c| self.guards.contains(&c)).collect();
        let body = match parts.len() {
            2 | 3 => parts[1],
            _ => parts[0],
        };

        let mut chars = body.chars();
        let lottery = chars.next()?;
        let rest = chars.as_str();

        let mut alphabet = self.alphabet.clone();
        let mut values = Vec::new();
        for chunk in rest.split(|c| self.separators.contains(&c)) {
            let buffer = self.shuffle_buffer(lottery, &alphabet);
            consistent_shuffle(&mut alphabet, &buffer);
            values.push(from_alphabet(chunk, &alphabet)?);
        }

        if self.encode_many(&values) != id {
            return None;
        }
        Some(values)
    }

    fn shuffle_buffer(&self, lottery: char, alphabet: &[char]) -> Vec<char> {
        let mut buffer = Vec::with_capacity(1 + self.salt.len() + alphabet.len());
        buffer.push(lottery);
        buffer.extend_from_slice(&self.salt);
        buffer.extend_from_slice(alphabet);
        buffer.truncate(alphabet.len());
        buffer
    }

    fn is_known(&self, c: char) -> bool {
        self.alphabet.contains(&c) || self.separators.contains(&c) || self.guards.contains(&c)
    }
}

/// Salt-keyed deterministic permutation of `alphabet` in place.
fn consistent_shuffle(alphabet: &mut [char], salt: &[char]) {
    if salt.is_empty() || alphabet.len() < 2 {
        return;
    }

    let mut v = 0usize;
    let mut p = 0usize;
    for i in (1..alphabet.len()).rev() {
        v %= salt.len();
        let code = salt[v] as usize;
        p += code;
        let j = (code + v + p) % i;
        alphabet.swap(i, j);
        v += 1;
    }
}

fn to_alphabet(mut value: u64, alphabet: &[char]) -> Vec<char> {
    let base = alphabet.len() as u64;
    let mut digits = Vec::new();
    loop {
        digits.push(alphabet[(value % base) as usize]);
        value /= base;
        if value == 0 {
            break;
        }
    }
    digits.reverse();
    digits
}

fn from_alphabet(input: &str, alphabet: &[char]) -> Option<u64> {
    let base = alphabet.len() as u64;
    input.chars().try_fold(0u64, |acc, c| {
        let digit = alphabet.iter().position(|&a| a == c)? as u64;
        acc.checked_mul(base)?.checked_add(digit)
    })
}
