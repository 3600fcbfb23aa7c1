//! 函数选择子派生。
//!
//! 规范签名为 `name(type1,type2,...)`，不含空格；对其 UTF-8 字节做
//! Keccak-256，取前 4 字节即选择子。签名文本的类型顺序即模式声明顺序，
//! 任何类型名或顺序的变化都会改变选择子。

use alloc::string::String;
use alloc::vec::Vec;

use sha3::{Digest, Keccak256};

/// 选择子字节宽度。
pub const SELECTOR_LEN: usize = 4;

/// 构造规范签名文本。
pub fn signature(function: &str, argument_types: &[String]) -> String {
    let mut out = String::with_capacity(function.len() + 2);
    out.push_str(function);
    out.push('(');
    for (index, ty) in argument_types.iter().enumerate() {
        if index > 0 {
            out.push(',');
        }
        out.push_str(ty);
    }
    out.push(')');
    out
}

/// 对签名文本求 Keccak-256 并取前 4 字节。
pub fn selector_of_signature(signature: &str) -> [u8; SELECTOR_LEN] {
    let digest = Keccak256::digest(signature.as_bytes());
    let mut selector = [0u8; SELECTOR_LEN];
    selector.copy_from_slice(&digest[..SELECTOR_LEN]);
    selector
}

/// 由函数名与有序参数类型派生选择子。
pub fn function_selector(function: &str, argument_types: &[String]) -> [u8; SELECTOR_LEN] {
    selector_of_signature(&signature(function, argument_types))
}

/// 选择子的连续字节形态，便于拼接负载。
pub fn selector_bytes(function: &str, argument_types: &[String]) -> Vec<u8> {
    function_selector(function, argument_types).to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;

    #[test]
    fn signature_has_no_spaces() {
        let types = vec!["address".to_string(), "uint256".to_string()];
        assert_eq!(signature("transfer", &types), "transfer(address,uint256)");
        assert_eq!(signature("noArgs", &[]), "noArgs()");
    }

    #[test]
    fn transfer_selector_matches_the_known_constant() {
        let types = vec!["address".to_string(), "uint256".to_string()];
        assert_eq!(function_selector("transfer", &types), [0xa9, 0x05, 0x9c, 0xbb]);
    }

    #[test]
    fn balance_of_selector_matches_the_known_constant() {
        let types = vec!["address".to_string()];
        assert_eq!(function_selector("balanceOf", &types), [0x70, 0xa0, 0x82, 0x31]);
    }

    #[test]
    fn selector_is_sensitive_to_order_and_names() {
        let forward = vec!["address".to_string(), "uint256".to_string()];
        let reversed = vec!["uint256".to_string(), "address".to_string()];
        assert_ne!(
            function_selector("transfer", &forward),
            function_selector("transfer", &reversed)
        );
        assert_ne!(
            function_selector("transfer", &forward),
            function_selector("transfeR", &forward)
        );
    }

    #[test]
    fn deterministic_across_invocations() {
        let types = vec!["uint256".to_string(), "bytes".to_string()];
        assert_eq!(
            function_selector("EtherWithdraw", &types),
            function_selector("EtherWithdraw", &types)
        );
    }
}
