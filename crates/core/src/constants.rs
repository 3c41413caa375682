use alloy::primitives::{Address, B256, U256, address, b256, uint};

/// The number of accounts that every provisioned node ends up with.
pub const TARGET_ACCOUNT_COUNT: usize = 10;

/// The balance, in wei, that every provisioned account is topped up to: 10 000 ether.
pub const TARGET_BALANCE: U256 = uint!(10_000_000_000_000_000_000_000_U256);

/// The secret keys imported into the nodes that support importing keys. These are the first ten
/// keys of the deterministic development mnemonic, and they belong to [`REQUIRED_ACCOUNTS`] in the
/// same order.
pub const WELL_KNOWN_KEYS: [B256; TARGET_ACCOUNT_COUNT] = [
    b256!("4f3edf983ac636a65a842ce7c78d9aa706d3b113bce9c46f30d7d21715b23b1d"),
    b256!("6cbed15c793ce57650b9877cf6fa156fbef513c4e6134f022a85b1ffdd59b2a1"),
    b256!("6370fd033278c143179d81c5526140625662b8daa446c22ee2d73db3707e620c"),
    b256!("646f1ce2fdad0e6deeeb5c7e8e5543bdde65e86029e2fd9fc169899c440a7913"),
    b256!("add53f9a7e588d003326d1cbf9e4a43c061aadd9bc938c843a79e7b4fd2ad743"),
    b256!("395df67f0c2d2d9fe1ad08d1bc8b6627011959b79c53d7dd6a3536a33ab8a4fd"),
    b256!("e485d098507f54e7733a205420dfddbe58db035fa577fc294ebd14db90767a52"),
    b256!("a453611d9419d0e56f499079478fd72c37b251a94bfde4d19872c44cf65386e3"),
    b256!("829e924fdf021ba3dbbc4225edfece9aca04b929d6e75613329ca6f1d31c0bb4"),
    b256!("b0057716d5917badaf911b193b12b910811c1497b5bada8d7711f758981c3773"),
];

/// The addresses that must be part of the provisioned account set.
pub const REQUIRED_ACCOUNTS: [Address; TARGET_ACCOUNT_COUNT] = [
    address!("0x90F8bf6A479f320ead074411a4B0e7944Ea8c9C1"),
    address!("0xFFcf8FDEE72ac11b5c542428B35EEF5769C409f0"),
    address!("0xE11BA2b4D45Eaed5996Cd0823791E0C93114882d"),
    address!("0x22d491Bde2303f2f43325b2108D26f1eAbA1e32b"),
    address!("0x95cED938F7991cd0dFcb48F0a06a40FA1aF46EBC"),
    address!("0xd03ea8624C8C5987235048901fB614fDcA89b117"),
    address!("0x3E5e9111Ae8eB78Fe1CC3bb8915d5D461F3Ef9A9"),
    address!("0x28a8746e75304c0780E011BEd21C72cD78cd535E"),
    address!("0xACa94ef8bD5ffEE41947b4585a84BdA5a3d3DA6E"),
    address!("0x1dF62f291b2E969fB0849d99D9Ce41e2F137006e"),
];

/// The passphrase used for every imported, created, and unlocked account.
pub const ACCOUNT_PASSPHRASE: &str = "";
