//! Парсер логов LeagueClientUx
//!
//! Клиент при каждом запуске пишет в лог адрес своего API вида
//! `riot:<token>@127.0.0.1:<port>`. В старых логах адреса нет, зато есть
//! аргументы командной строки `--remoting-auth-token=` и `--riotclient-app-port=`.
//! Лог только дописывается, поэтому везде берём последнее вхождение.

use log::{debug, trace};
use regex::Regex;

use crate::types::ConnectionDescriptor;

const LOCAL_HOST: &str = "127.0.0.1";

/// Парсер учётных данных LCU
pub struct CredentialParser {
    // riot:abc123@127.0.0.1:9001
    address_re: Regex,
    // --remoting-auth-token=abc123
    token_flag_re: Regex,
    // --riotclient-app-port=9001
    port_flag_re: Regex,
}

impl CredentialParser {
    pub fn new() -> Self {
        Self {
            address_re: Regex::new(r"(?i)riot:([a-z0-9_-]+)@127\.0\.0\.1:([0-9]+)").unwrap(),
            token_flag_re: Regex::new(r"(?i)--remoting-auth-token=([a-z0-9_-]+)").unwrap(),
            port_flag_re: Regex::new(r"(?i)--riotclient-app-port=([0-9]+)").unwrap(),
        }
    }

    /// Последний анонс адреса `riot:<token>@127.0.0.1:<port>`
    pub fn parse_announcement(&self, text: &str) -> Option<ConnectionDescriptor> {
        self.address_re
            .captures_iter(text)
            .filter_map(|caps| {
                let token = caps.get(1)?.as_str();
                let port: u16 = caps.get(2)?.as_str().parse().ok()?;
                Some(ConnectionDescriptor::new(LOCAL_HOST, port, token))
            })
            .last()
    }

    /// Последние флаги токена и порта, найденные независимо друг от друга
    pub fn parse_flags(&self, text: &str) -> Option<ConnectionDescriptor> {
        let token = self
            .token_flag_re
            .captures_iter(text)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
            .last()?;
        let port = self
            .port_flag_re
            .captures_iter(text)
            .filter_map(|caps| caps.get(1)?.as_str().parse::<u16>().ok())
            .last()?;
        Some(ConnectionDescriptor::new(LOCAL_HOST, port, token))
    }

    /// Сначала адрес целиком, потом флаги
    pub fn parse(&self, text: &str) -> Option<ConnectionDescriptor> {
        if let Some(found) = self.parse_announcement(text) {
            debug!("LCU address announcement found: {}", found);
            return Some(found);
        }
        trace!("No address announcement, falling back to command line flags");
        let found = self.parse_flags(text)?;
        debug!("LCU credentials assembled from flags: {}", found);
        Some(found)
    }
}

impl Default for CredentialParser {
    fn default() -> Self {
        Self::new()
    }
}
