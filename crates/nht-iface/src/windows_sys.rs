use crate::{ConnectedAddress, ConnectedAddressSource, IfaceError};
use nht_common::Prefix;
use std::future::Future;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::slice;
use windows::Win32::NetworkManagement::IpHelper::{FreeMibTable, GetUnicastIpAddressTable};
use windows::Win32::Networking::WinSock::{ADDRESS_FAMILY, AF_INET, AF_INET6, AF_UNSPEC, SOCKADDR_INET};

#[inline(always)]
unsafe fn convert_ip_address(address: SOCKADDR_INET) -> Option<IpAddr> {
    match address.si_family {
        AF_INET => Some(IpAddr::V4(Ipv4Addr::from(address.Ipv4.sin_addr.S_un.S_addr))),
        AF_INET6 => Some(IpAddr::V6(Ipv6Addr::from(address.Ipv6.sin6_addr.u.Byte))),
        _ => None,
    }
}

pub struct WindowsConnectedAddressSource;

impl ConnectedAddressSource for WindowsConnectedAddressSource {
    fn new() -> Result<Self, IfaceError> {
        Ok(WindowsConnectedAddressSource)
    }

    fn all(&self) -> impl Future<Output = Result<Vec<ConnectedAddress>, IfaceError>> + Send {
        fn enumerate_table(addresses: &mut Vec<ConnectedAddress>, family: ADDRESS_FAMILY) -> Result<(), IfaceError> {
            let mut table_ptr = std::ptr::null_mut();
            let result = unsafe { GetUnicastIpAddressTable(family, &mut table_ptr) };
            if result.is_err() {
                return Err(IfaceError::Win32(result.0 as u32));
            }

            if !table_ptr.is_null() {
                let table = unsafe { &*table_ptr };
                for row in unsafe { slice::from_raw_parts(table.Table.as_ptr(), table.NumEntries as _) } {
                    if let Some(address) = unsafe { convert_ip_address(row.Address) } {
                        addresses.push(ConnectedAddress {
                            interface_index: row.InterfaceIndex,
                            prefix: Prefix {
                                address,
                                mask: row.OnLinkPrefixLength,
                            },
                        });
                    }
                }
            }
            unsafe { FreeMibTable(table_ptr as *mut _) };
            Ok(())
        }

        async {
            let mut addresses = Vec::new();
            enumerate_table(&mut addresses, AF_UNSPEC)?;
            Ok(addresses)
        }
    }
}
