/// Connected-account source
///
/// The balance layer only needs the read side of a wallet: which account is
/// connected right now, if any.
use crate::logger::{self, LogTag};
use parking_lot::RwLock;
use std::sync::Arc;

pub trait WalletProvider: Send + Sync {
    fn connected_account(&self) -> Option<String>;
}

impl<W: WalletProvider + ?Sized> WalletProvider for Arc<W> {
    fn connected_account(&self) -> Option<String> {
        (**self).connected_account()
    }
}

/// In-memory wallet session that can be connected, switched and disconnected
#[derive(Debug, Default)]
pub struct SessionWallet {
    account: RwLock<Option<String>>,
}

impl SessionWallet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connected(account: &str) -> Self {
        let wallet = Self::new();
        wallet.connect(account);
        wallet
    }

    pub fn connect(&self, account: &str) {
        let account = account.trim().to_string();
        logger::info(LogTag::Wallet, &format!("Connected {}", account));
        *self.account.write() = Some(account);
    }

    pub fn disconnect(&self) {
        if let Some(previous) = self.account.write().take() {
            logger::info(LogTag::Wallet, &format!("Disconnected {}", previous));
        }
    }
}

impl WalletProvider for SessionWallet {
    fn connected_account(&self) -> Option<String> {
        self.account
            .read()
            .clone()
            .filter(|account| !account.is_empty())
    }
}
