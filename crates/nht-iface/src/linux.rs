use crate::{ConnectedAddress, ConnectedAddressSource, IfaceError};
use futures_util::TryStreamExt;
use netlink_packet_route::address::{AddressAttribute, AddressMessage};
use nht_common::Prefix;
use rtnetlink::{new_connection, Handle};
use std::future::Future;
use tokio::task::JoinHandle;

pub struct LinuxConnectedAddressSource {
    netlink_handle: Handle,
    _connection_thread: JoinHandle<()>,
}

impl ConnectedAddressSource for LinuxConnectedAddressSource {
    fn new() -> Result<Self, IfaceError> {
        let (connection, netlink_handle, _) = new_connection()?;
        let connection_thread = tokio::spawn(connection);
        Ok(Self {
            netlink_handle,
            _connection_thread: connection_thread,
        })
    }

    fn all(&self) -> impl Future<Output = Result<Vec<ConnectedAddress>, IfaceError>> + Send {
        fn netlink_address_to_connected(message: AddressMessage) -> Option<ConnectedAddress> {
            // `Local` carries the actual interface address for point-to-point
            // links where it differs from `Address` (the peer); fall back to
            // `Address` for the common broadcast-link case.
            let address = message.attributes.iter().find_map(|attr| match attr {
                AddressAttribute::Local(addr) => Some(*addr),
                AddressAttribute::Address(addr) => Some(*addr),
                _ => None,
            })?;
            Some(ConnectedAddress {
                interface_index: message.header.index,
                prefix: Prefix {
                    address,
                    mask: message.header.prefix_len,
                },
            })
        }

        async {
            let mut addresses = Vec::new();
            let mut stream = self.netlink_handle.address().get().execute();
            while let Some(message) = stream.try_next().await? {
                if let Some(connected) = netlink_address_to_connected(message) {
                    addresses.push(connected);
                }
            }
            Ok(addresses)
        }
    }
}
