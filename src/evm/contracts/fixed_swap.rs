/// Fixed-price swap sale contract helpers
///
/// A fixed swap sells a fixed amount of an ERC-20 token for the native
/// currency at a constant trade value. The sale moves through pre-start,
/// funded, open and finalized phases; purchases are recorded on-chain and
/// redeemed once the sale is over unless the swap is atomic.
///
/// Amounts cross this API as decimal strings: token amounts use the sold
/// token's decimals, native amounts (trade value, costs, minimum raise) use
/// 18 decimals.
///
/// # Example
///
/// ```rust,no_run
/// use fixed_swap_sdk::evm::{ContractDescriptor, Contract, EvmClient, SigningStrategy};
/// use fixed_swap_sdk::evm::contracts::{FixedSwap, SaleParams};
/// use fixed_swap_sdk::wallet::LocalAccount;
/// use alloy_primitives::address;
/// use chrono::{Duration, Utc};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Arc::new(EvmClient::new("http://localhost:8545", 1337)?);
/// let descriptor = Arc::new(ContractDescriptor::from_file("artifacts/FixedSwap.json")?);
/// let owner = LocalAccount::from_private_key("0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80")?;
///
/// let params = SaleParams::new(
///     address!("5FbDB2315678afecb367f032d93F642f64180aa3"),
///     18,
///     "0.01",
///     "0.03",
///     Utc::now() + Duration::minutes(4),
///     Utc::now() + Duration::minutes(8),
/// );
/// let (sale, _receipt) =
///     FixedSwap::deploy(Contract::new(client, descriptor), SigningStrategy::Local(&owner), &params).await?;
///
/// sale.approve_fund_erc20(SigningStrategy::Local(&owner), "0.03").await?;
/// sale.fund(SigningStrategy::Local(&owner), "0.03").await?;
/// println!("Tokens left: {}", sale.tokens_left().await?);
/// # Ok(())
/// # }
/// ```
use crate::error::Error;
use crate::evm::contract::{Contract, DeployRequest, SigningStrategy};
use crate::evm::contracts::erc20::Erc20;
use crate::evm::types::utils::{format_ether, format_units, parse_ether, parse_units};
use crate::evm::types::{EvmError, TransactionReceipt};
use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::sol;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

sol! {
    #[derive(Debug)]
    interface IFixedSwap {
        // Lifecycle
        function isPreStart() external view returns (bool);
        function hasStarted() external view returns (bool);
        function isOpen() external view returns (bool);
        function hasFinalized() external view returns (bool);
        function isFunded() external view returns (bool);
        function minimumReached() external view returns (bool);

        // Amounts
        function tokensLeft() external view returns (uint256);
        function tokensAvailable() external view returns (uint256);
        function tokensAllocated() external view returns (uint256);
        function tokensForSale() external view returns (uint256);
        function tradeValue() external view returns (uint256);
        function individualMinimumAmount() external view returns (uint256);
        function individualMaximumAmount() external view returns (uint256);
        function minimumRaise() external view returns (uint256);
        function cost(uint256 amount) external view returns (uint256);

        // Configuration
        function startDate() external view returns (uint256);
        function endDate() external view returns (uint256);
        function hasWhitelisting() external view returns (bool);
        function isTokenSwapAtomic() external view returns (bool);
        function owner() external view returns (address);
        function erc20() external view returns (address);
        function feePercentage() external view returns (uint256);

        // Purchases
        function getPurchase(uint256 purchaseId) external view returns (
            uint256 amount,
            address purchaser,
            uint256 ethAmount,
            uint256 timestamp,
            bool wasFinalized,
            bool reverted
        );
        function getPurchaseIds() external view returns (uint256[] memory);
        function getBuyers() external view returns (address[] memory);
        function getMyPurchases(address buyer) external view returns (uint256[] memory);

        // State-changing functions
        function swap(uint256 amount, bytes signature) external payable;
        function fund(uint256 amount) external;
        function redeemTokens(uint256 purchaseId) external;
        function redeemGivenMinimumGoalNotAchieved(uint256 purchaseId) external;
        function withdrawFunds() external;
        function withdrawUnsoldTokens() external;
        function setIndividualMaximumAmount(uint256 individualMaximumAmount) external;
        function setSignerPublicKey(address signerPublicKey) external;
        function pause() external;
        function unpause() external;
    }
}

/// Sale lifecycle phase, most advanced phase first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleState {
    /// Deployed but not funded
    PreStart,
    /// Funded, start date not reached
    Funded,
    /// Accepting purchases
    Open,
    /// End date passed or all tokens sold
    Finalized,
}

/// A recorded purchase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub id: U256,
    /// Tokens bought, in display decimals
    pub amount: String,
    pub purchaser: Address,
    /// Native currency paid, in display decimals
    pub cost: String,
    pub timestamp: DateTime<Utc>,
    pub was_finalized: bool,
    pub reverted: bool,
    /// Tokens `redeem_tokens` would deliver right now, in display decimals
    pub amount_to_redeem_now: String,
}

/// Parameters of a new fixed-price sale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleParams {
    /// Token being sold
    pub token_address: Address,
    /// Decimals of the token being sold
    pub token_decimals: u8,
    /// Native currency paid per whole token
    pub trade_value: String,
    pub tokens_for_sale: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub individual_minimum_amount: String,
    pub individual_maximum_amount: String,
    /// Tokens are delivered in the swap transaction itself
    pub is_token_swap_atomic: bool,
    /// Native currency that must be raised for the sale to succeed
    pub minimum_raise: String,
    /// Fee taken from the raise, in percent
    pub fee_percentage: u8,
    pub has_whitelisting: bool,
}

/// Validated sale parameters in base units
#[derive(Debug, Clone, PartialEq, Eq)]
struct EncodedSale {
    trade_value: U256,
    tokens_for_sale: U256,
    start_date: U256,
    end_date: U256,
    individual_minimum_amount: U256,
    individual_maximum_amount: U256,
    minimum_raise: U256,
    fee_percentage: U256,
}

impl SaleParams {
    /// Sale of `tokens_for_sale` at `trade_value`, open between `start_date` and `end_date`
    ///
    /// The individual maximum defaults to the whole sale; the minimum and the
    /// minimum raise default to zero; the fee defaults to 1%.
    pub fn new(
        token_address: Address,
        token_decimals: u8,
        trade_value: &str,
        tokens_for_sale: &str,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Self {
        Self {
            token_address,
            token_decimals,
            trade_value: trade_value.to_string(),
            tokens_for_sale: tokens_for_sale.to_string(),
            start_date,
            end_date,
            individual_minimum_amount: "0".to_string(),
            individual_maximum_amount: tokens_for_sale.to_string(),
            is_token_swap_atomic: false,
            minimum_raise: "0".to_string(),
            fee_percentage: 1,
            has_whitelisting: false,
        }
    }

    pub fn individual_minimum_amount(mut self, amount: &str) -> Self {
        self.individual_minimum_amount = amount.to_string();
        self
    }

    pub fn individual_maximum_amount(mut self, amount: &str) -> Self {
        self.individual_maximum_amount = amount.to_string();
        self
    }

    pub fn minimum_raise(mut self, amount: &str) -> Self {
        self.minimum_raise = amount.to_string();
        self
    }

    pub fn fee_percentage(mut self, fee_percentage: u8) -> Self {
        self.fee_percentage = fee_percentage;
        self
    }

    pub fn atomic(mut self, is_token_swap_atomic: bool) -> Self {
        self.is_token_swap_atomic = is_token_swap_atomic;
        self
    }

    pub fn whitelisting(mut self, has_whitelisting: bool) -> Self {
        self.has_whitelisting = has_whitelisting;
        self
    }

    /// Check the parameters and convert them to base units
    fn encode(&self) -> Result<EncodedSale, Error> {
        let invalid = |msg: &str| Err(Error::Contract(format!("Invalid sale: {}", msg)));

        let trade_value = parse_ether(&self.trade_value)?;
        let tokens_for_sale = parse_units(&self.tokens_for_sale, self.token_decimals)?;
        let individual_minimum_amount =
            parse_units(&self.individual_minimum_amount, self.token_decimals)?;
        let individual_maximum_amount =
            parse_units(&self.individual_maximum_amount, self.token_decimals)?;
        let minimum_raise = parse_ether(&self.minimum_raise)?;

        if self.start_date >= self.end_date {
            return invalid("start date must be before end date");
        }
        if self.start_date.timestamp() < 0 {
            return invalid("start date must be after the Unix epoch");
        }
        if tokens_for_sale.is_zero() {
            return invalid("tokens for sale must be positive");
        }
        if trade_value.is_zero() {
            return invalid("trade value must be positive");
        }
        if individual_maximum_amount.is_zero() {
            return invalid("individual maximum must be positive");
        }
        if individual_maximum_amount < individual_minimum_amount {
            return invalid("individual maximum is below the individual minimum");
        }
        if individual_maximum_amount > tokens_for_sale {
            return invalid("individual maximum exceeds tokens for sale");
        }
        if !(1..=99).contains(&self.fee_percentage) {
            return invalid("fee percentage must be between 1 and 99");
        }

        Ok(EncodedSale {
            trade_value,
            tokens_for_sale,
            start_date: U256::from(self.start_date.timestamp() as u64),
            end_date: U256::from(self.end_date.timestamp() as u64),
            individual_minimum_amount,
            individual_maximum_amount,
            minimum_raise,
            fee_percentage: U256::from(self.fee_percentage),
        })
    }

    /// Constructor arguments in declaration order
    fn constructor_args(&self) -> Result<Vec<DynSolValue>, Error> {
        let sale = self.encode()?;
        Ok(vec![
            DynSolValue::Address(self.token_address),
            DynSolValue::Uint(sale.trade_value, 256),
            DynSolValue::Uint(sale.tokens_for_sale, 256),
            DynSolValue::Uint(sale.start_date, 256),
            DynSolValue::Uint(sale.end_date, 256),
            DynSolValue::Uint(sale.individual_minimum_amount, 256),
            DynSolValue::Uint(sale.individual_maximum_amount, 256),
            DynSolValue::Bool(self.is_token_swap_atomic),
            DynSolValue::Uint(sale.minimum_raise, 256),
            DynSolValue::Uint(sale.fee_percentage, 256),
            DynSolValue::Bool(self.has_whitelisting),
        ])
    }
}

/// Fixed-price swap sale helper
#[derive(Debug, Clone)]
pub struct FixedSwap {
    contract: Contract,
    token: Erc20,
    decimals: u8,
}

impl FixedSwap {
    /// Deploy a new sale with `contract`'s descriptor and bind to it
    pub async fn deploy(
        mut contract: Contract,
        strategy: SigningStrategy<'_>,
        params: &SaleParams,
    ) -> Result<(Self, TransactionReceipt), Error> {
        let args = params.constructor_args()?;
        let receipt = contract.deploy(strategy, DeployRequest::new(args)).await?;

        info!(
            token = %params.token_address,
            tokens_for_sale = %params.tokens_for_sale,
            "Fixed swap sale deployed"
        );

        let token = Erc20::new(contract.client().clone(), params.token_address)
            .with_settings(contract.settings().clone());
        let sale = Self {
            contract,
            token,
            decimals: params.token_decimals,
        };
        Ok((sale, receipt))
    }

    /// Attach to a bound sale contract, reading its token and the token decimals
    pub async fn connect(contract: Contract) -> Result<Self, Error> {
        let token_address = contract.call(&IFixedSwap::erc20Call {}).await?._0;
        let token = Erc20::new(contract.client().clone(), token_address)
            .with_settings(contract.settings().clone());
        let decimals = token.decimals().await?;

        Ok(Self {
            contract,
            token,
            decimals,
        })
    }

    /// Attach to a bound sale contract whose token is already known
    pub fn with_token(contract: Contract, token_address: Address, decimals: u8) -> Self {
        let token = Erc20::new(contract.client().clone(), token_address)
            .with_settings(contract.settings().clone());
        Self {
            contract,
            token,
            decimals,
        }
    }

    /// The underlying contract adapter
    pub fn contract(&self) -> &Contract {
        &self.contract
    }

    /// The token being sold
    pub fn token(&self) -> &Erc20 {
        &self.token
    }

    /// Sale contract address
    pub fn address(&self) -> Option<Address> {
        self.contract.address()
    }

    /// Decimals of the token being sold
    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    fn to_token_units(&self, amount: &str) -> Result<U256, Error> {
        parse_units(amount, self.decimals)
    }

    fn from_token_units(&self, amount: U256) -> String {
        format_units(amount, self.decimals)
    }

    fn sale_address(&self) -> Result<Address, Error> {
        self.contract
            .address()
            .ok_or_else(|| Error::Contract("Contract is not deployed or bound".to_string()))
    }

    // ========== Lifecycle ==========

    /// Deployed but not yet funded
    pub async fn is_pre_start(&self) -> Result<bool, Error> {
        Ok(self.contract.call(&IFixedSwap::isPreStartCall {}).await?._0)
    }

    /// Start date reached
    pub async fn has_started(&self) -> Result<bool, Error> {
        Ok(self.contract.call(&IFixedSwap::hasStartedCall {}).await?._0)
    }

    /// Accepting purchases
    pub async fn is_open(&self) -> Result<bool, Error> {
        Ok(self.contract.call(&IFixedSwap::isOpenCall {}).await?._0)
    }

    /// End date passed or sold out
    pub async fn has_finalized(&self) -> Result<bool, Error> {
        Ok(self.contract.call(&IFixedSwap::hasFinalizedCall {}).await?._0)
    }

    pub async fn is_funded(&self) -> Result<bool, Error> {
        Ok(self.contract.call(&IFixedSwap::isFundedCall {}).await?._0)
    }

    pub async fn minimum_reached(&self) -> Result<bool, Error> {
        Ok(self.contract.call(&IFixedSwap::minimumReachedCall {}).await?._0)
    }

    /// Most advanced phase the sale is in
    pub async fn sale_state(&self) -> Result<SaleState, Error> {
        if self.has_finalized().await? {
            return Ok(SaleState::Finalized);
        }
        if self.is_open().await? {
            return Ok(SaleState::Open);
        }
        if self.is_funded().await? {
            return Ok(SaleState::Funded);
        }
        Ok(SaleState::PreStart)
    }

    // ========== Amounts ==========

    /// Tokens not yet sold
    pub async fn tokens_left(&self) -> Result<String, Error> {
        let result = self.contract.call(&IFixedSwap::tokensLeftCall {}).await?;
        Ok(self.from_token_units(result._0))
    }

    /// Tokens funded and still available
    pub async fn tokens_available(&self) -> Result<String, Error> {
        let result = self
            .contract
            .call(&IFixedSwap::tokensAvailableCall {})
            .await?;
        Ok(self.from_token_units(result._0))
    }

    /// Tokens sold so far
    pub async fn tokens_allocated(&self) -> Result<String, Error> {
        let result = self
            .contract
            .call(&IFixedSwap::tokensAllocatedCall {})
            .await?;
        Ok(self.from_token_units(result._0))
    }

    pub async fn tokens_for_sale(&self) -> Result<String, Error> {
        let result = self
            .contract
            .call(&IFixedSwap::tokensForSaleCall {})
            .await?;
        Ok(self.from_token_units(result._0))
    }

    /// Native currency per whole token
    pub async fn trade_value(&self) -> Result<String, Error> {
        let result = self.contract.call(&IFixedSwap::tradeValueCall {}).await?;
        Ok(format_ether(result._0))
    }

    pub async fn individual_minimum_amount(&self) -> Result<String, Error> {
        let result = self
            .contract
            .call(&IFixedSwap::individualMinimumAmountCall {})
            .await?;
        Ok(self.from_token_units(result._0))
    }

    pub async fn individual_maximum_amount(&self) -> Result<String, Error> {
        let result = self
            .contract
            .call(&IFixedSwap::individualMaximumAmountCall {})
            .await?;
        Ok(self.from_token_units(result._0))
    }

    /// Native currency that must be raised
    pub async fn minimum_raise(&self) -> Result<String, Error> {
        let result = self.contract.call(&IFixedSwap::minimumRaiseCall {}).await?;
        Ok(format_ether(result._0))
    }

    /// Native cost of buying `amount` tokens
    pub async fn cost_from_tokens(&self, amount: &str) -> Result<String, Error> {
        let cost = self.cost_wei(self.to_token_units(amount)?).await?;
        Ok(format_ether(cost))
    }

    async fn cost_wei(&self, amount: U256) -> Result<U256, Error> {
        Ok(self
            .contract
            .call(&IFixedSwap::costCall { amount })
            .await?
            ._0)
    }

    // ========== Configuration ==========

    pub async fn start_date(&self) -> Result<DateTime<Utc>, Error> {
        let result = self.contract.call(&IFixedSwap::startDateCall {}).await?;
        to_datetime(result._0)
    }

    pub async fn end_date(&self) -> Result<DateTime<Utc>, Error> {
        let result = self.contract.call(&IFixedSwap::endDateCall {}).await?;
        to_datetime(result._0)
    }

    pub async fn has_whitelisting(&self) -> Result<bool, Error> {
        Ok(self
            .contract
            .call(&IFixedSwap::hasWhitelistingCall {})
            .await?
            ._0)
    }

    pub async fn is_token_swap_atomic(&self) -> Result<bool, Error> {
        Ok(self
            .contract
            .call(&IFixedSwap::isTokenSwapAtomicCall {})
            .await?
            ._0)
    }

    pub async fn owner(&self) -> Result<Address, Error> {
        Ok(self.contract.call(&IFixedSwap::ownerCall {}).await?._0)
    }

    /// Address of the token being sold, as recorded by the contract
    pub async fn token_address(&self) -> Result<Address, Error> {
        Ok(self.contract.call(&IFixedSwap::erc20Call {}).await?._0)
    }

    pub async fn fee_percentage(&self) -> Result<u64, Error> {
        let result = self
            .contract
            .call(&IFixedSwap::feePercentageCall {})
            .await?;
        u64::try_from(result._0)
            .map_err(|e| EvmError::InvalidAmount(format!("fee percentage: {}", e)).into())
    }

    // ========== Purchases ==========

    /// Ids of all purchases
    pub async fn purchase_ids(&self) -> Result<Vec<U256>, Error> {
        Ok(self
            .contract
            .call(&IFixedSwap::getPurchaseIdsCall {})
            .await?
            ._0)
    }

    /// Ids of the purchases made by `address`
    pub async fn address_purchase_ids(&self, address: Address) -> Result<Vec<U256>, Error> {
        Ok(self
            .contract
            .call(&IFixedSwap::getMyPurchasesCall { buyer: address })
            .await?
            ._0)
    }

    pub async fn purchase(&self, id: U256) -> Result<Purchase, Error> {
        let result = self
            .contract
            .call(&IFixedSwap::getPurchaseCall { purchaseId: id })
            .await?;

        let redeemable = self
            .redeemable(result.wasFinalized, result.reverted)
            .await?;
        let amount_to_redeem_now = if redeemable {
            self.from_token_units(result.amount)
        } else {
            "0".to_string()
        };

        Ok(Purchase {
            id,
            amount: self.from_token_units(result.amount),
            purchaser: result.purchaser,
            cost: format_ether(result.ethAmount),
            timestamp: to_datetime(result.timestamp)?,
            was_finalized: result.wasFinalized,
            reverted: result.reverted,
            amount_to_redeem_now,
        })
    }

    /// Whether an open purchase can be redeemed for tokens now
    ///
    /// Tokens are released once the sale has finalized with its minimum raise
    /// reached; settled or reverted purchases have nothing left.
    async fn redeemable(&self, was_finalized: bool, reverted: bool) -> Result<bool, Error> {
        if was_finalized || reverted || !self.has_finalized().await? {
            return Ok(false);
        }
        self.minimum_reached().await
    }

    /// Addresses that bought at least once
    pub async fn buyers(&self) -> Result<Vec<Address>, Error> {
        Ok(self.contract.call(&IFixedSwap::getBuyersCall {}).await?._0)
    }

    // ========== Transactions ==========

    /// Approve the sale contract to pull `amount` tokens for funding
    pub async fn approve_fund_erc20(
        &self,
        strategy: SigningStrategy<'_>,
        amount: &str,
    ) -> Result<TransactionReceipt, Error> {
        let spender = self.sale_address()?;
        let amount = self.to_token_units(amount)?;
        self.token.approve(strategy, spender, amount).await
    }

    /// Whether `owner` allowed the sale contract to pull at least `amount` tokens
    pub async fn is_approved(&self, owner: Address, amount: &str) -> Result<bool, Error> {
        let spender = self.sale_address()?;
        let amount = self.to_token_units(amount)?;
        let allowance = self.token.allowance(owner, spender).await?;
        Ok(allowance >= amount)
    }

    /// Transfer `amount` tokens into the sale
    pub async fn fund(
        &self,
        strategy: SigningStrategy<'_>,
        amount: &str,
    ) -> Result<TransactionReceipt, Error> {
        let amount = self.to_token_units(amount)?;
        self.contract
            .transact(strategy, &IFixedSwap::fundCall { amount }, U256::ZERO)
            .await
    }

    /// Buy `amount` tokens, paying their cost in the native currency
    ///
    /// `signature` is the whitelist signature over the buyer's address; pass
    /// an empty value for sales without whitelisting.
    pub async fn swap(
        &self,
        strategy: SigningStrategy<'_>,
        amount: &str,
        signature: Bytes,
    ) -> Result<TransactionReceipt, Error> {
        let amount = self.to_token_units(amount)?;
        let cost = self.cost_wei(amount).await?;

        info!(%amount, %cost, "Swapping for tokens");
        self.contract
            .transact(strategy, &IFixedSwap::swapCall { amount, signature }, cost)
            .await
    }

    /// Collect the tokens of a purchase after the sale ends
    pub async fn redeem_tokens(
        &self,
        strategy: SigningStrategy<'_>,
        purchase_id: U256,
    ) -> Result<TransactionReceipt, Error> {
        let call = IFixedSwap::redeemTokensCall {
            purchaseId: purchase_id,
        };
        self.contract.transact(strategy, &call, U256::ZERO).await
    }

    /// Reclaim the native currency of a purchase when the minimum raise was missed
    pub async fn redeem_given_minimum_goal_not_achieved(
        &self,
        strategy: SigningStrategy<'_>,
        purchase_id: U256,
    ) -> Result<TransactionReceipt, Error> {
        let call = IFixedSwap::redeemGivenMinimumGoalNotAchievedCall {
            purchaseId: purchase_id,
        };
        self.contract.transact(strategy, &call, U256::ZERO).await
    }

    /// Owner: withdraw the raised native currency
    pub async fn withdraw_funds(
        &self,
        strategy: SigningStrategy<'_>,
    ) -> Result<TransactionReceipt, Error> {
        self.contract
            .transact(strategy, &IFixedSwap::withdrawFundsCall {}, U256::ZERO)
            .await
    }

    /// Owner: withdraw tokens that were not sold
    pub async fn withdraw_unsold_tokens(
        &self,
        strategy: SigningStrategy<'_>,
    ) -> Result<TransactionReceipt, Error> {
        self.contract
            .transact(strategy, &IFixedSwap::withdrawUnsoldTokensCall {}, U256::ZERO)
            .await
    }

    /// Owner: change the individual maximum purchase
    pub async fn set_individual_maximum_amount(
        &self,
        strategy: SigningStrategy<'_>,
        amount: &str,
    ) -> Result<TransactionReceipt, Error> {
        let call = IFixedSwap::setIndividualMaximumAmountCall {
            individualMaximumAmount: self.to_token_units(amount)?,
        };
        self.contract.transact(strategy, &call, U256::ZERO).await
    }

    /// Owner: set the address whose signatures whitelist buyers
    pub async fn set_signer_public_address(
        &self,
        strategy: SigningStrategy<'_>,
        address: Address,
    ) -> Result<TransactionReceipt, Error> {
        let call = IFixedSwap::setSignerPublicKeyCall {
            signerPublicKey: address,
        };
        self.contract.transact(strategy, &call, U256::ZERO).await
    }

    /// Owner: stop accepting purchases
    pub async fn pause(&self, strategy: SigningStrategy<'_>) -> Result<TransactionReceipt, Error> {
        self.contract
            .transact(strategy, &IFixedSwap::pauseCall {}, U256::ZERO)
            .await
    }

    /// Owner: resume accepting purchases
    pub async fn unpause(
        &self,
        strategy: SigningStrategy<'_>,
    ) -> Result<TransactionReceipt, Error> {
        self.contract
            .transact(strategy, &IFixedSwap::unpauseCall {}, U256::ZERO)
            .await
    }
}

fn to_datetime(seconds: U256) -> Result<DateTime<Utc>, Error> {
    let seconds = i64::try_from(seconds)
        .map_err(|e| EvmError::InvalidAmount(format!("timestamp out of range: {}", e)))?;
    Utc.timestamp_opt(seconds, 0)
        .single()
        .ok_or_else(|| EvmError::InvalidAmount(format!("invalid timestamp {}", seconds)).into())
}
