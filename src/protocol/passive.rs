use std::net::{Ipv4Addr, SocketAddrV4};

use crate::error::{Error, Result};

/// Extracts the data connection address from the text of a `227` reply,
/// e.g. `Entering Passive Mode (192,168,1,2,19,137).`
pub fn parse_passive(message: &str) -> Result<SocketAddrV4> {
    let bad = || Error::BadReply(format!("cannot find passive address in {message:?}"));

    let tuple = match (message.find('('), message.rfind(')')) {
        (Some(start), Some(end)) if start < end => &message[start + 1..end],
        _ => message
            .split_whitespace()
            .last()
            .map(|word| word.trim_end_matches('.'))
            .ok_or_else(bad)?,
    };

    let numbers = tuple
        .split(',')
        .map(|n| n.trim().parse::<u8>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| bad())?;

    match numbers[..] {
        [a, b, c, d, hi, lo] => Ok(SocketAddrV4::new(
            Ipv4Addr::new(a, b, c, d),
            (u16::from(hi) << 8) | u16::from(lo),
        )),
        _ => Err(bad()),
    }
}
