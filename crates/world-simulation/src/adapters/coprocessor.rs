//! # In-Memory FHE Coprocessor
//!
//! Deterministic stand-in for the external coprocessor, in the spirit of a
//! local mock network: ciphertexts are plaintexts kept in a private table and
//! handles are Keccak-256 digests, so nothing about a handle reveals its value.
//!
//! Proofs are the digest of `(contract, user, handles)`. That is enough to
//! exercise the binding rules (wrong caller, wrong contract, tampered handle
//! all fail) without any real cryptography.

use crate::domain::entities::EncryptedDecision;
use crate::domain::value_objects::{Address, CiphertextHandle, InputProof};
use crate::errors::CoprocessorError;
use crate::ports::outbound::{FheCoprocessor, ProofBinding};
use parking_lot::RwLock;
use sha3::{Digest, Keccak256};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

const INPUT_DOMAIN: &[u8] = b"world-sim/input";
const RESULT_DOMAIN: &[u8] = b"world-sim/result";
const PROOF_DOMAIN: &[u8] = b"world-sim/proof";

/// Coprocessor behaviour switches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CoprocessorConfig {
    /// Accept all-zero handles with an empty proof as encryptions of zero.
    ///
    /// Mirrors the dummy payload local networks accept when no real FHE
    /// instance is available.
    pub allow_trivial_inputs: bool,
}

/// Handles and proof returned by client-side encryption.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptedInput {
    /// One handle per encrypted value, in order.
    pub handles: Vec<CiphertextHandle>,
    /// Proof binding the handles to contract and user.
    pub proof: InputProof,
}

impl EncryptedInput {
    /// Converts a four-value input into decision arguments.
    ///
    /// Returns None unless exactly four handles are present.
    #[must_use]
    pub fn into_decision(self) -> Option<EncryptedDecision> {
        let handles: [CiphertextHandle; 4] = self.handles.try_into().ok()?;
        Some(EncryptedDecision::new(handles, self.proof))
    }
}

#[derive(Clone, Copy, Debug)]
enum Origin {
    Input { contract: Address, user: Address },
    Computed,
}

#[derive(Clone, Copy, Debug)]
struct Ciphertext {
    value: u32,
    origin: Origin,
}

/// In-memory coprocessor.
#[derive(Debug, Default)]
pub struct InMemoryCoprocessor {
    config: CoprocessorConfig,
    ciphertexts: RwLock<HashMap<CiphertextHandle, Ciphertext>>,
    acl: RwLock<HashSet<(CiphertextHandle, Address)>>,
    nonce: AtomicU64,
}

impl InMemoryCoprocessor {
    /// Strict coprocessor: every input needs a valid proof.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Coprocessor that also accepts the trivial all-zero payload.
    #[must_use]
    pub fn permissive() -> Self {
        Self::with_config(CoprocessorConfig {
            allow_trivial_inputs: true,
        })
    }

    /// Coprocessor with explicit configuration.
    #[must_use]
    pub fn with_config(config: CoprocessorConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Number of ciphertexts held.
    #[must_use]
    pub fn ciphertext_count(&self) -> usize {
        self.ciphertexts.read().len()
    }

    // =========================================================================
    // CLIENT SIDE
    // =========================================================================

    /// Encrypts `values` for `user` to submit to `contract`.
    pub fn encrypt_inputs(
        &self,
        contract: Address,
        user: Address,
        values: &[u32],
    ) -> EncryptedInput {
        let nonce = self.nonce.fetch_add(1, Ordering::Relaxed);
        let handles: Vec<CiphertextHandle> = values
            .iter()
            .enumerate()
            .map(|(index, _)| {
                let mut hasher = Keccak256::new();
                hasher.update(INPUT_DOMAIN);
                hasher.update(nonce.to_be_bytes());
                hasher.update(contract.as_bytes());
                hasher.update(user.as_bytes());
                hasher.update((index as u64).to_be_bytes());
                CiphertextHandle::new(hasher.finalize().into())
            })
            .collect();

        {
            let mut table = self.ciphertexts.write();
            let mut acl = self.acl.write();
            for (handle, value) in handles.iter().zip(values) {
                table.insert(
                    *handle,
                    Ciphertext {
                        value: *value,
                        origin: Origin::Input { contract, user },
                    },
                );
                acl.insert((*handle, user));
            }
        }

        let proof = InputProof::from_slice(&proof_digest(contract, user, &handles));
        EncryptedInput { handles, proof }
    }

    /// Encrypts four KPI deltas as decision arguments.
    pub fn encrypt_decision(
        &self,
        contract: Address,
        user: Address,
        values: [u32; 4],
    ) -> EncryptedDecision {
        let EncryptedInput { handles, proof } = self.encrypt_inputs(contract, user, &values);
        let mut fixed = [CiphertextHandle::ZERO; 4];
        fixed.copy_from_slice(&handles);
        EncryptedDecision::new(fixed, proof)
    }

    /// Decrypts `handle` on behalf of `user`.
    ///
    /// # Errors
    ///
    /// `UnknownHandle` for handles this coprocessor never issued,
    /// `AccessNotAllowed` if `user` was never granted the handle.
    pub fn user_decrypt(
        &self,
        handle: CiphertextHandle,
        user: Address,
    ) -> Result<u32, CoprocessorError> {
        if !handle.is_initialized() {
            return Ok(0);
        }
        let value = self.lookup(handle)?;
        if !self.acl.read().contains(&(handle, user)) {
            return Err(CoprocessorError::AccessNotAllowed {
                handle,
                requester: user,
            });
        }
        Ok(value)
    }

    /// Decrypts every handle of `handles` on behalf of `user`.
    ///
    /// # Errors
    ///
    /// The first failure of [`Self::user_decrypt`].
    pub fn user_decrypt_many(
        &self,
        handles: &[CiphertextHandle],
        user: Address,
    ) -> Result<BTreeMap<CiphertextHandle, u32>, CoprocessorError> {
        handles
            .iter()
            .map(|h| self.user_decrypt(*h, user).map(|v| (*h, v)))
            .collect()
    }

    /// True if `grantee` may use `handle`.
    #[must_use]
    pub fn is_allowed(&self, handle: CiphertextHandle, grantee: Address) -> bool {
        self.acl.read().contains(&(handle, grantee))
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn lookup(&self, handle: CiphertextHandle) -> Result<u32, CoprocessorError> {
        if !handle.is_initialized() {
            return Ok(0);
        }
        self.ciphertexts
            .read()
            .get(&handle)
            .map(|c| c.value)
            .ok_or(CoprocessorError::UnknownHandle(handle))
    }

    fn mint(&self, value: u32, parents: &[CiphertextHandle]) -> CiphertextHandle {
        let nonce = self.nonce.fetch_add(1, Ordering::Relaxed);
        let mut hasher = Keccak256::new();
        hasher.update(RESULT_DOMAIN);
        hasher.update(nonce.to_be_bytes());
        for parent in parents {
            hasher.update(parent.as_bytes());
        }
        let handle = CiphertextHandle::new(hasher.finalize().into());
        self.ciphertexts.write().insert(
            handle,
            Ciphertext {
                value,
                origin: Origin::Computed,
            },
        );
        handle
    }
}

fn proof_digest(contract: Address, user: Address, handles: &[CiphertextHandle]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(PROOF_DOMAIN);
    hasher.update(contract.as_bytes());
    hasher.update(user.as_bytes());
    for handle in handles {
        hasher.update(handle.as_bytes());
    }
    hasher.finalize().into()
}

impl FheCoprocessor for InMemoryCoprocessor {
    fn verify_inputs(
        &self,
        handles: &[CiphertextHandle],
        proof: &InputProof,
        binding: ProofBinding,
    ) -> Result<Vec<CiphertextHandle>, CoprocessorError> {
        if self.config.allow_trivial_inputs
            && proof.is_empty()
            && handles.iter().all(|h| !h.is_initialized())
        {
            debug!(count = handles.len(), "Accepted trivial zero inputs");
            return Ok(handles.to_vec());
        }

        if proof.as_slice() != proof_digest(binding.contract, binding.user, handles).as_slice() {
            return Err(CoprocessorError::ProofRejected(
                "proof does not bind handles to caller and contract".into(),
            ));
        }

        let table = self.ciphertexts.read();
        for handle in handles {
            match table.get(handle).map(|c| c.origin) {
                Some(Origin::Input { contract, user })
                    if contract == binding.contract && user == binding.user => {}
                Some(_) => {
                    return Err(CoprocessorError::ProofRejected(format!(
                        "handle {handle} was not encrypted by {} for {}",
                        binding.user, binding.contract
                    )))
                }
                None => return Err(CoprocessorError::UnknownHandle(*handle)),
            }
        }

        Ok(handles.to_vec())
    }

    fn add(
        &self,
        lhs: CiphertextHandle,
        rhs: CiphertextHandle,
    ) -> Result<CiphertextHandle, CoprocessorError> {
        let sum = self.lookup(lhs)?.wrapping_add(self.lookup(rhs)?);
        Ok(self.mint(sum, &[lhs, rhs]))
    }

    fn add_scalar(
        &self,
        lhs: CiphertextHandle,
        scalar: u32,
    ) -> Result<CiphertextHandle, CoprocessorError> {
        let sum = self.lookup(lhs)?.wrapping_add(scalar);
        Ok(self.mint(sum, &[lhs]))
    }

    fn allow(&self, handle: CiphertextHandle, grantee: Address) -> Result<(), CoprocessorError> {
        if !handle.is_initialized() {
            return Ok(());
        }
        self.lookup(handle)?;
        self.acl.write().insert((handle, grantee));
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
