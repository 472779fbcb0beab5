use crate::CustomContractError;
use concordium_std::*;

/// Addresses allowed to reconfigure a contract instance.
#[derive(Debug, Serial, DeserialWithState, StateClone)]
#[concordium(state_parameter = "S")]
pub struct Authority<S: HasStateApi> {
    /// Trusted addresses. May change both lists and every configuration value.
    admins: StateSet<Address, S>,
    /// Semi-trusted addresses. May change configuration values and the maintainer list.
    maintainers: StateSet<Address, S>,
}

impl<S: HasStateApi> Authority<S> {
    /// Creates an authority with `admin` as the only admin and no maintainers.
    pub fn new(state_builder: &mut StateBuilder<S>, admin: Address) -> Self {
        let mut admins = state_builder.new_set();
        admins.insert(admin);
        Self {
            admins,
            maintainers: state_builder.new_set(),
        }
    }

    pub fn has_admin_rights(&self, address: &Address) -> bool {
        self.admins.contains(address)
    }

    pub fn has_maintainer_rights(&self, address: &Address) -> bool {
        self.maintainers.contains(address) || self.has_admin_rights(address)
    }

    /// Rejects with `Unauthorized` unless `address` is a maintainer or an admin.
    pub fn ensure_maintainer(&self, address: &Address) -> Result<(), CustomContractError> {
        ensure!(
            self.has_maintainer_rights(address),
            CustomContractError::Unauthorized
        );
        Ok(())
    }

    /// Adds or removes an address. Maintainers may only touch the maintainer list.
    ///
    /// Adding an existing address or removing a missing one is not an error.
    pub fn handle_update(
        &mut self,
        sender: Address,
        update: AuthorityUpdateParams,
    ) -> Result<(), CustomContractError> {
        let address_list = match update.field {
            AuthorityField::Maintainer => {
                self.ensure_maintainer(&sender)?;
                &mut self.maintainers
            }
            AuthorityField::Admin => {
                ensure!(
                    self.has_admin_rights(&sender),
                    CustomContractError::Unauthorized
                );
                &mut self.admins
            }
        };

        match update.kind {
            AuthorityUpdateKind::Remove => {
                address_list.remove(&update.address);
            }
            AuthorityUpdateKind::Add => {
                address_list.insert(update.address);
            }
        }

        Ok(())
    }

    /// Page through one of the lists.
    pub fn handle_view(&self, view: AuthorityViewParams) -> Vec<Address> {
        let address_list = match view.field {
            AuthorityField::Maintainer => &self.maintainers,
            AuthorityField::Admin => &self.admins,
        };

        address_list
            .iter()
            .skip(view.skip as usize)
            .take(view.show as usize)
            .map(|a| *a)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, SchemaType, Serialize)]
pub enum AuthorityField {
    Maintainer,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, SchemaType, Serialize)]
pub enum AuthorityUpdateKind {
    Remove,
    Add,
}

#[derive(Debug, SchemaType, Serialize)]
pub struct AuthorityUpdateParams {
    pub field: AuthorityField,
    pub kind: AuthorityUpdateKind,
    pub address: Address,
}

#[derive(Debug, SchemaType, Serialize)]
pub struct AuthorityViewParams {
    pub field: AuthorityField,
    pub skip: u32,
    pub show: u32,
}

#[concordium_cfg_test]
mod tests {
    use super::*;
    use concordium_std::test_infrastructure::*;

    const ADMIN: AccountAddress = AccountAddress([1; 32]);
    const MAINTAINER: AccountAddress = AccountAddress([2; 32]);
    const MAINTAINER_CONTRACT: ContractAddress = ContractAddress {
        index: 2,
        subindex: 0,
    };
    const USER: AccountAddress = AccountAddress([16; 32]);

    fn default_authority() -> Authority<TestStateApi> {
        let mut state_builder = TestStateBuilder::new();
        let mut authority = Authority::new(&mut state_builder, Address::Account(ADMIN));
        authority.maintainers.insert(Address::Account(MAINTAINER));
        authority
            .maintainers
            .insert(Address::Contract(MAINTAINER_CONTRACT));
        authority
    }

    fn update(field: AuthorityField, kind: AuthorityUpdateKind, address: Address) -> AuthorityUpdateParams {
        AuthorityUpdateParams {
            field,
            kind,
            address,
        }
    }

    #[concordium_test]
    fn test_admin_is_maintainer() {
        let authority = default_authority();

        claim!(authority.has_admin_rights(&Address::Account(ADMIN)));
        claim!(authority.has_maintainer_rights(&Address::Account(ADMIN)));
        claim!(!authority.has_admin_rights(&Address::Account(MAINTAINER)));
        claim!(authority.has_maintainer_rights(&Address::Account(MAINTAINER)));
        claim_eq!(authority.ensure_maintainer(&Address::Account(ADMIN)), Ok(()));
        claim_eq!(
            authority.ensure_maintainer(&Address::Account(USER)),
            Err(CustomContractError::Unauthorized)
        );
    }

    #[concordium_test]
    fn test_maintainer_cannot_add_admin() {
        let mut authority = default_authority();

        let result = authority.handle_update(
            Address::Account(MAINTAINER),
            update(
                AuthorityField::Admin,
                AuthorityUpdateKind::Add,
                Address::Account(USER),
            ),
        );
        claim_eq!(result, Err(CustomContractError::Unauthorized));
        claim!(!authority.has_maintainer_rights(&Address::Account(USER)));

        let result = authority.handle_update(
            Address::Account(ADMIN),
            update(
                AuthorityField::Admin,
                AuthorityUpdateKind::Add,
                Address::Account(USER),
            ),
        );
        claim_eq!(result, Ok(()));
        claim!(authority.has_admin_rights(&Address::Account(USER)));
    }

    #[concordium_test]
    fn test_maintainer_manages_maintainers() {
        let mut authority = default_authority();

        let result = authority.handle_update(
            Address::Contract(MAINTAINER_CONTRACT),
            update(
                AuthorityField::Maintainer,
                AuthorityUpdateKind::Add,
                Address::Account(USER),
            ),
        );
        claim_eq!(result, Ok(()));
        claim!(authority.has_maintainer_rights(&Address::Account(USER)));
        claim!(!authority.has_admin_rights(&Address::Account(USER)));

        let result = authority.handle_update(
            Address::Account(USER),
            update(
                AuthorityField::Maintainer,
                AuthorityUpdateKind::Remove,
                Address::Account(MAINTAINER),
            ),
        );
        claim_eq!(result, Ok(()));
        claim!(!authority.has_maintainer_rights(&Address::Account(MAINTAINER)));

        // Removing a missing address is a no-op
        let result = authority.handle_update(
            Address::Account(USER),
            update(
                AuthorityField::Maintainer,
                AuthorityUpdateKind::Remove,
                Address::Account(MAINTAINER),
            ),
        );
        claim_eq!(result, Ok(()));
    }

    #[concordium_test]
    fn test_outsider_cannot_update() {
        let mut authority = default_authority();

        let result = authority.handle_update(
            Address::Account(USER),
            update(
                AuthorityField::Maintainer,
                AuthorityUpdateKind::Add,
                Address::Account(USER),
            ),
        );
        claim_eq!(result, Err(CustomContractError::Unauthorized));
        claim!(!authority.has_maintainer_rights(&Address::Account(USER)));
    }

    #[concordium_test]
    fn test_view_pages() {
        let mut authority = default_authority();
        for n in 16u8..26 {
            authority.admins.insert(Address::Account(AccountAddress([n; 32])));
        }

        let first = authority.handle_view(AuthorityViewParams {
            field: AuthorityField::Admin,
            skip: 0,
            show: 8,
        });
        let rest = authority.handle_view(AuthorityViewParams {
            field: AuthorityField::Admin,
            skip: 8,
            show: 8,
        });
        claim_eq!(first.len(), 8);
        claim_eq!(rest.len(), 3);
        claim!(rest.iter().all(|address| !first.contains(address)));

        let maintainers = authority.handle_view(AuthorityViewParams {
            field: AuthorityField::Maintainer,
            skip: 0,
            show: 10,
        });
        claim_eq!(maintainers.len(), 2);
    }
}
