//! Conversions between wei, gwei, and eth denominations.
//!
//! Amounts are u128 wei internally; formatting trims trailing zeros so CLI
//! output reads naturally.

/// Wei per gwei
pub const WEI_PER_GWEI: u128 = 1_000_000_000;
/// Wei per eth
pub const WEI_PER_ETH: u128 = 1_000_000_000_000_000_000;

/// Convert a gwei amount to wei
pub fn gwei_to_wei(gwei: u128) -> u128 {
    gwei * WEI_PER_GWEI
}

/// Convert a whole-eth amount to wei
pub fn eth_to_wei(eth: u128) -> u128 {
    eth * WEI_PER_ETH
}

/// Format a wei amount as a decimal eth string, e.g. `1.5` or `0.000000001`
pub fn wei_to_eth_string(wei: u128) -> String {
    let whole = wei / WEI_PER_ETH;
    let frac = wei % WEI_PER_ETH;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{:018}", frac);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}

/// Format a wei amount as a decimal gwei string
pub fn wei_to_gwei_string(wei: u128) -> String {
    let whole = wei / WEI_PER_GWEI;
    let frac = wei % WEI_PER_GWEI;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{:09}", frac);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_conversions() {
        assert_eq!(gwei_to_wei(1), 1_000_000_000);
        assert_eq!(eth_to_wei(2), 2_000_000_000_000_000_000);
    }

    #[test]
    fn test_eth_formatting() {
        assert_eq!(wei_to_eth_string(0), "0");
        assert_eq!(wei_to_eth_string(WEI_PER_ETH), "1");
        assert_eq!(wei_to_eth_string(WEI_PER_ETH + WEI_PER_ETH / 2), "1.5");
        assert_eq!(wei_to_eth_string(1), "0.000000000000000001");
        assert_eq!(wei_to_eth_string(WEI_PER_GWEI), "0.000000001");
    }

    #[test]
    fn test_gwei_formatting() {
        assert_eq!(wei_to_gwei_string(WEI_PER_GWEI), "1");
        assert_eq!(wei_to_gwei_string(1_500_000_000), "1.5");
        assert_eq!(wei_to_gwei_string(1), "0.000000001");
    }
}
