use commons::{
    Token, ITEM_BOUGHT_TAG, ITEM_CANCELED_TAG, ITEM_LISTED_TAG, PRICE_UPDATED_TAG, WITHDRAWAL_TAG,
};
use concordium_std::*;

/// Token listed for sale.
#[derive(Debug, Serial)]
pub struct ItemListedEvent<'a> {
    pub token: &'a Token,
    pub price: Amount,
    pub seller: &'a AccountAddress,
}

/// Listed token sold.
#[derive(Debug, Serial)]
pub struct ItemBoughtEvent<'a> {
    pub buyer: &'a AccountAddress,
    pub token: &'a Token,
    /// Listing price. Any overpayment is not part of it.
    pub price: Amount,
}

#[derive(Debug, Serial)]
pub struct ItemCanceledEvent<'a> {
    pub token: &'a Token,
    /// Seller recorded in the listing, not necessarily the address that canceled it.
    pub seller: &'a AccountAddress,
}

#[derive(Debug, Serial)]
pub struct PriceUpdatedEvent<'a> {
    pub token: &'a Token,
    pub price: Amount,
}

#[derive(Debug, Serial)]
pub struct WithdrawalEvent<'a> {
    pub account: &'a AccountAddress,
    pub amount: Amount,
}

/// Tagged marketplace event to be serialized for the event log.
#[derive(Debug)]
pub enum MarketplaceEvent<'a> {
    ItemListed(ItemListedEvent<'a>),
    ItemBought(ItemBoughtEvent<'a>),
    ItemCanceled(ItemCanceledEvent<'a>),
    PriceUpdated(PriceUpdatedEvent<'a>),
    Withdrawal(WithdrawalEvent<'a>),
}

impl<'a> MarketplaceEvent<'a> {
    pub fn item_listed(token: &'a Token, price: Amount, seller: &'a AccountAddress) -> Self {
        Self::ItemListed(ItemListedEvent {
            token,
            price,
            seller,
        })
    }

    pub fn item_bought(buyer: &'a AccountAddress, token: &'a Token, price: Amount) -> Self {
        Self::ItemBought(ItemBoughtEvent {
            buyer,
            token,
            price,
        })
    }

    pub fn item_canceled(token: &'a Token, seller: &'a AccountAddress) -> Self {
        Self::ItemCanceled(ItemCanceledEvent { token, seller })
    }

    pub fn price_updated(token: &'a Token, price: Amount) -> Self {
        Self::PriceUpdated(PriceUpdatedEvent { token, price })
    }

    pub fn withdrawal(account: &'a AccountAddress, amount: Amount) -> Self {
        Self::Withdrawal(WithdrawalEvent { account, amount })
    }
}

impl<'a> Serial for MarketplaceEvent<'a> {
    fn serial<W: Write>(&self, out: &mut W) -> Result<(), W::Err> {
        match self {
            MarketplaceEvent::ItemListed(event) => {
                out.write_u8(ITEM_LISTED_TAG)?;
                event.serial(out)
            }
            MarketplaceEvent::ItemBought(event) => {
                out.write_u8(ITEM_BOUGHT_TAG)?;
                event.serial(out)
            }
            MarketplaceEvent::ItemCanceled(event) => {
                out.write_u8(ITEM_CANCELED_TAG)?;
                event.serial(out)
            }
            MarketplaceEvent::PriceUpdated(event) => {
                out.write_u8(PRICE_UPDATED_TAG)?;
                event.serial(out)
            }
            MarketplaceEvent::Withdrawal(event) => {
                out.write_u8(WITHDRAWAL_TAG)?;
                event.serial(out)
            }
        }
    }
}
