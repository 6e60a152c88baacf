// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Random invite codes and document IDs.

use crate::error::AppError;
use ring::rand::{SecureRandom, SystemRandom};

/// Length of a flat invite code.
pub const INVITE_CODE_LEN: usize = 6;

const INVITE_ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
/// Largest multiple of the alphabet size that fits in a byte; bytes at or
/// above it are discarded so every symbol is equally likely.
const UNBIASED_LIMIT: u8 = 252;
const DOCUMENT_ID_BYTES: usize = 10;

/// Source of invite codes and document IDs backed by the OS RNG.
#[derive(Clone)]
pub struct CodeGenerator {
    rng: SystemRandom,
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeGenerator {
    pub fn new() -> Self {
        Self {
            rng: SystemRandom::new(),
        }
    }

    /// A fresh invite code matching `^[A-Z0-9]{6}$`.
    pub fn invite_code(&self) -> Result<String, AppError> {
        let mut code = String::with_capacity(INVITE_CODE_LEN);
        let mut buf = [0u8; 16];

        while code.len() < INVITE_CODE_LEN {
            self.fill(&mut buf)?;
            for &byte in buf.iter().filter(|&&b| b < UNBIASED_LIMIT) {
                if code.len() == INVITE_CODE_LEN {
                    break;
                }
                code.push(INVITE_ALPHABET[(byte % 36) as usize] as char);
            }
        }

        Ok(code)
    }

    /// A random 20-character hex document ID.
    pub fn document_id(&self) -> Result<String, AppError> {
        let mut buf = [0u8; DOCUMENT_ID_BYTES];
        self.fill(&mut buf)?;
        Ok(hex::encode(buf))
    }

    fn fill(&self, buf: &mut [u8]) -> Result<(), AppError> {
        self.rng
            .fill(buf)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("System RNG failure")))
    }
}

/// Whether `code` is a well-formed invite code.
pub fn is_valid_invite_code(code: &str) -> bool {
    code.len() == INVITE_CODE_LEN
        && code
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

/// Normalize user input (`" abc123 "` → `"ABC123"`) and check its format.
pub fn normalize_invite_code(raw: &str) -> Option<String> {
    let code = raw.trim().to_ascii_uppercase();
    is_valid_invite_code(&code).then_some(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_invite_codes_match_format() {
        let generator = CodeGenerator::new();
        for _ in 0..500 {
            let code = generator.invite_code().unwrap();
            assert!(is_valid_invite_code(&code), "bad code {code}");
        }
    }

    #[test]
    fn test_invite_codes_vary() {
        let generator = CodeGenerator::new();
        let codes: HashSet<String> = (0..50).map(|_| generator.invite_code().unwrap()).collect();
        assert!(codes.len() > 45);
    }

    #[test]
    fn test_document_id_is_hex() {
        let id = CodeGenerator::new().document_id().unwrap();
        assert_eq!(id.len(), 2 * DOCUMENT_ID_BYTES);
        assert!(id.bytes().all(|b| b.is_ascii_hexdigit()));
    }

    #[test]
    fn test_normalize_invite_code() {
        assert_eq!(normalize_invite_code(" ab12cd\n"), Some("AB12CD".to_string()));
        assert_eq!(normalize_invite_code("AB12C"), None);
        assert_eq!(normalize_invite_code("AB12CDE"), None);
        assert_eq!(normalize_invite_code("AB-2CD"), None);
        assert_eq!(normalize_invite_code("ÁB12CD"), None);
    }
}
