//! Public/private key selector

use std::fmt;

/// Which half of the key pair a transform uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    PublicKey,
    PrivateKey,
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyType::PublicKey => f.write_str("public key"),
            KeyType::PrivateKey => f.write_str("private key"),
        }
    }
}
