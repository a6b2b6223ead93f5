//! Symbol lists from configuration.

use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SymbolListError {
    #[error("empty token in symbol list")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),
}

/// Split a comma list into upper-cased symbols, preserving order.
pub fn parse_symbols(input: &str) -> Result<Vec<String>, SymbolListError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(SymbolListError::EmptyToken);
        }
        let symbol = trimmed.to_uppercase();
        if !seen.insert(symbol.clone()) {
            return Err(SymbolListError::DuplicateSymbol(symbol));
        }
        symbols.push(symbol);
    }

    Ok(symbols)
}
