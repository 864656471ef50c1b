//! Administrative role (`feeToSetter`)
//!
//! One slot, one-step transfer. The holder can hand the role to anyone,
//! including itself; the previous holder loses authority immediately.

use crate::error::{RegistryError, Result};
use pair_types::EthAddress;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminRole {
    holder: EthAddress,
}

impl AdminRole {
    /// Role held by the registry's deployer
    pub fn new(initial_holder: EthAddress) -> Self {
        Self {
            holder: initial_holder,
        }
    }

    pub fn holder(&self) -> EthAddress {
        self.holder
    }

    pub fn is_holder(&self, caller: EthAddress) -> bool {
        self.holder == caller
    }

    /// Move the role to `new_holder`, returning the previous holder
    pub fn transfer(&mut self, caller: EthAddress, new_holder: EthAddress) -> Result<EthAddress> {
        if !self.is_holder(caller) {
            return Err(RegistryError::Unauthorized { caller });
        }
        let previous = self.holder;
        self.holder = new_holder;
        Ok(previous)
    }
}
