//! # Checkout Orchestrator
//!
//! The operations callers invoke. Each one composes pure pricing/loyalty
//! math from checkout-core, the repositories and the checkout transaction
//! from checkout-db, and the provider integration from checkout-gateway.
//!
//! ## Ordering Decisions
//! - Prices for all lines are resolved at one caller-supplied instant, so
//!   an order never mixes weekday and weekend prices and a checkout can
//!   be replayed deterministically.
//! - Loyalty points are awarded right after the checkout transaction
//!   commits, on the committed sum.
//! - On the online path the provider is asked for the redirect URL before
//!   the payment row is written: a provider failure leaves the committed
//!   order with no payment row, and payment creation can be retried.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use checkout_core::{
    loyalty, pricing, Address, Money, Order, OrderItem, OrderStatus, Payment, PaymentMethod,
    PaymentStatus, PricingRule,
};
use checkout_db::{generate_payment_id, CheckoutLine, Database, DbError};
use checkout_gateway::{
    CallbackOutcome, CallbackPayload, GatewayConfig, ProviderClient, RedirectRequest,
};

use crate::error::{CheckoutError, CheckoutResult};

// =============================================================================
// Request / Response Types
// =============================================================================

/// What a caller supplies to convert their cart into an order.
#[derive(Debug, Clone)]
pub struct CreateOrderRequest {
    pub user_id: String,
    pub cart_id: String,
    pub address_id: String,
    pub payment_method: PaymentMethod,
    /// Payer IP, forwarded to the provider on the online path.
    pub payer_ip: String,
}

/// The result of a successful checkout.
#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub address: Address,
    pub payment: Payment,
    /// Where to send the payer; only set for online payments.
    pub redirect_url: Option<String>,
}

/// An order with its frozen items and payment, as read back later.
#[derive(Debug, Clone)]
pub struct OrderView {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub payment: Option<Payment>,
}

// =============================================================================
// Checkout Service
// =============================================================================

/// Orchestrates checkout, payments and loyalty over the lower crates.
#[derive(Clone)]
pub struct CheckoutService {
    db: Database,
    provider: Arc<dyn ProviderClient>,
    gateway: GatewayConfig,
}

impl CheckoutService {
    /// Creates a new service over a database, a provider client and the
    /// gateway configuration.
    pub fn new(db: Database, provider: Arc<dyn ProviderClient>, gateway: GatewayConfig) -> Self {
        CheckoutService {
            db,
            provider,
            gateway,
        }
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Converts the caller's cart into an order.
    ///
    /// `now` is the pricing instant for every line; the service never
    /// reads a clock, so a checkout can be replayed at a fixed instant.
    ///
    /// ## Steps
    /// 1. Load the cart and verify it belongs to the caller; an absent or
    ///    foreign cart reads as NotFound, an empty one as EmptyCart.
    /// 2. Verify the shipping address belongs to the caller.
    /// 3. Resolve every line's unit price at `now`.
    /// 4. Run the checkout transaction (stock, order, items, cart).
    /// 5. Award loyalty points on the committed sum.
    /// 6. Create the payment for the chosen method.
    pub async fn create_order(
        &self,
        request: &CreateOrderRequest,
        now: DateTime<Utc>,
    ) -> CheckoutResult<CheckoutOutcome> {
        // Ownership failures read as absence, like the address lookup.
        let cart = self
            .db
            .carts()
            .get_by_id(&request.cart_id)
            .await?
            .filter(|cart| cart.user_id == request.user_id)
            .ok_or_else(|| DbError::not_found("Cart", &request.cart_id))?;

        let cart_items = self.db.carts().items(&cart.id).await?;
        if cart_items.is_empty() {
            return Err(checkout_core::CoreError::EmptyCart(cart.id.clone()).into());
        }

        let address = self
            .db
            .addresses()
            .get_owned(&request.address_id, &request.user_id)
            .await?;

        let mut lines = Vec::with_capacity(cart_items.len());
        for item in &cart_items {
            let product = self
                .db
                .products()
                .get_by_id(&item.product_id)
                .await?
                .ok_or_else(|| {
                    checkout_core::CoreError::ProductNotFound(item.product_id.clone())
                })?;

            let candidates = self
                .db
                .pricing_rules()
                .candidates_for_product(&product.id)
                .await?;

            let unit_price = pricing::resolve(&product, &candidates, now)?;

            lines.push(CheckoutLine {
                product_id: item.product_id.clone(),
                quantity: item.quantity,
                unit_price_cents: unit_price.cents(),
            });
        }

        let (order, items) = self
            .db
            .orders()
            .create_checkout(
                &request.user_id,
                &address.id,
                &cart.id,
                request.payment_method,
                &lines,
            )
            .await?;

        self.award_points(&order).await?;

        let (payment, redirect_url) = self.create_payment(&order, &request.payer_ip).await?;

        info!(
            order_id = %order.id,
            user_id = %order.user_id,
            sum_cents = order.sum_cents,
            method = ?order.payment_method,
            "Order created"
        );

        Ok(CheckoutOutcome {
            order,
            items,
            address,
            payment,
            redirect_url,
        })
    }

    // =========================================================================
    // Pricing
    // =========================================================================

    /// Resolves the authoritative unit price of a product at `at`.
    pub async fn resolve_price(
        &self,
        product_id: &str,
        at: DateTime<Utc>,
    ) -> CheckoutResult<Money> {
        let product = self.db.products().get_required(product_id).await?;
        let candidates = self
            .db
            .pricing_rules()
            .candidates_for_product(product_id)
            .await?;
        Ok(pricing::resolve(&product, &candidates, at)?)
    }

    /// Lists the rules applicable to a product at `at`.
    pub async fn applicable_rules(
        &self,
        product_id: &str,
        at: DateTime<Utc>,
    ) -> CheckoutResult<Vec<PricingRule>> {
        let product = self.db.products().get_required(product_id).await?;
        let candidates = self
            .db
            .pricing_rules()
            .candidates_for_product(product_id)
            .await?;
        let applicable = pricing::applicable_rules(&product, &candidates, at)?;
        Ok(applicable.into_iter().cloned().collect())
    }

    /// Awards loyalty points for a committed order. Sub-threshold sums
    /// award nothing and append no ledger row.
    async fn award_points(&self, order: &Order) -> CheckoutResult<()> {
        let points = loyalty::points_for_order(order.sum());
        if points > 0 {
            self.db
                .loyalty()
                .earn(&order.user_id, points, &format!("order: {}", order.id))
                .await?;
        }
        Ok(())
    }

    /// Creates the payment for a freshly committed order.
    ///
    /// Online: the payment id is quoted to the provider as the merchant
    /// reference before the row is written, so the callback can find the
    /// payment by that reference.
    async fn create_payment(
        &self,
        order: &Order,
        payer_ip: &str,
    ) -> CheckoutResult<(Payment, Option<String>)> {
        match order.payment_method {
            PaymentMethod::CashOnDelivery => {
                let payment = self
                    .db
                    .payments()
                    .create(
                        &generate_payment_id(),
                        &order.id,
                        PaymentMethod::CashOnDelivery,
                        order.sum_cents,
                        None,
                        None,
                    )
                    .await?;
                Ok((payment, None))
            }

            PaymentMethod::Online => {
                self.gateway.check_amount(order.sum_cents)?;

                let payment_id = generate_payment_id();

                let redirect = self
                    .provider
                    .request_redirect(&RedirectRequest {
                        merchant_id: self.gateway.merchant_id.clone(),
                        amount: order.sum_cents,
                        description: format!("Order {}", order.id),
                        payer_ip: payer_ip.to_string(),
                        return_url: self.gateway.return_url.clone(),
                        merchant_reference: payment_id.clone(),
                    })
                    .await?;

                let details = serde_json::json!({ "redirect_url": redirect.redirect_url });

                let payment = self
                    .db
                    .payments()
                    .create(
                        &payment_id,
                        &order.id,
                        PaymentMethod::Online,
                        order.sum_cents,
                        None,
                        Some(&details.to_string()),
                    )
                    .await?;

                Ok((payment, Some(redirect.redirect_url)))
            }
        }
    }

    // =========================================================================
    // Provider Callback
    // =========================================================================

    /// Handles an inbound provider callback.
    ///
    /// The provider delivers at-least-once, so the handler must tolerate
    /// replays: a callback on an already-terminal payment is a no-op that
    /// acknowledges with the stored state. An invalid signature never
    /// moves the payment; the handler still acknowledges so the provider
    /// does not retry forever.
    pub async fn handle_callback(
        &self,
        fields: BTreeMap<String, String>,
    ) -> CheckoutResult<Payment> {
        let payload = CallbackPayload::parse(fields)?;

        let payment = self
            .db
            .payments()
            .get_by_id(&payload.merchant_ref)
            .await?
            .ok_or_else(|| DbError::not_found("Payment", &payload.merchant_ref))?;

        if payment.status.is_terminal() {
            warn!(
                payment_id = %payment.id,
                status = ?payment.status,
                "Callback replay on settled payment, acknowledging stored state"
            );
            return Ok(payment);
        }

        if payment.method == PaymentMethod::CashOnDelivery {
            warn!(
                payment_id = %payment.id,
                "Callback targeted a cash-on-delivery payment, ignoring"
            );
            return Ok(payment);
        }

        let next = match payload.outcome(&self.gateway.secret) {
            CallbackOutcome::Unauthenticated => {
                // Acknowledge without trusting anything in the payload.
                return Ok(payment);
            }
            CallbackOutcome::Success => PaymentStatus::Completed,
            CallbackOutcome::Failure => PaymentStatus::Failed,
        };

        self.db
            .payments()
            .transition(&payment.id, next, Some(&payload.transaction_id))
            .await?;

        let settled = self
            .db
            .payments()
            .get_by_id(&payment.id)
            .await?
            .ok_or_else(|| DbError::not_found("Payment", &payment.id))?;

        Ok(settled)
    }

    // =========================================================================
    // COD Operator Actions
    // =========================================================================

    /// Marks a cash-on-delivery payment completed (operator action).
    pub async fn complete_cod_payment(&self, order_id: &str) -> CheckoutResult<Payment> {
        self.settle_cod(order_id, PaymentStatus::Completed).await
    }

    /// Marks a cash-on-delivery payment failed (operator action).
    pub async fn fail_cod_payment(&self, order_id: &str) -> CheckoutResult<Payment> {
        self.settle_cod(order_id, PaymentStatus::Failed).await
    }

    async fn settle_cod(&self, order_id: &str, to: PaymentStatus) -> CheckoutResult<Payment> {
        let payment = self.db.payments().get_required_by_order(order_id).await?;

        if payment.method != PaymentMethod::CashOnDelivery {
            return Err(CheckoutError::NotCashOnDelivery {
                payment_id: payment.id,
            });
        }

        let applied = self.db.payments().transition(&payment.id, to, None).await?;
        if !applied {
            return Err(CheckoutError::PaymentAlreadySettled {
                payment_id: payment.id,
            });
        }

        let settled = self.db.payments().get_required_by_order(order_id).await?;
        Ok(settled)
    }

    // =========================================================================
    // Order Management
    // =========================================================================

    /// Reads an order with its items and payment.
    pub async fn get_order(&self, order_id: &str) -> CheckoutResult<OrderView> {
        let order = self.db.orders().get_required(order_id).await?;
        let items = self.db.orders().items(order_id).await?;
        let payment = self.db.payments().get_by_order(order_id).await?;

        Ok(OrderView {
            order,
            items,
            payment,
        })
    }

    /// Lists a user's orders, newest first.
    pub async fn orders_for_user(&self, user_id: &str) -> CheckoutResult<Vec<Order>> {
        Ok(self.db.orders().orders_for_user(user_id).await?)
    }

    /// Updates the mutable order fields: status and/or tracking number.
    pub async fn update_status(
        &self,
        order_id: &str,
        status: Option<OrderStatus>,
        tracking_number: Option<&str>,
    ) -> CheckoutResult<Order> {
        Ok(self
            .db
            .orders()
            .update_status(order_id, status, tracking_number)
            .await?)
    }

    /// Hard-deletes an order (admin action). Items and payment go with it;
    /// stock and awarded points are not compensated.
    pub async fn delete_order(&self, order_id: &str) -> CheckoutResult<()> {
        Ok(self.db.orders().delete(order_id).await?)
    }

    // =========================================================================
    // Loyalty
    // =========================================================================

    /// Redeems points from a user's balance.
    pub async fn redeem_points(
        &self,
        user_id: &str,
        points: i64,
        reason: &str,
    ) -> CheckoutResult<()> {
        self.db.loyalty().redeem(user_id, points, reason).await?;
        Ok(())
    }

    /// Gets a user's current points balance.
    pub async fn points_balance(&self, user_id: &str) -> CheckoutResult<i64> {
        Ok(self.db.loyalty().balance(user_id).await?)
    }

    /// Gets a user's ledger history, newest first.
    pub async fn points_history(
        &self,
        user_id: &str,
    ) -> CheckoutResult<Vec<checkout_core::LoyaltyTransaction>> {
        Ok(self.db.loyalty().history(user_id).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use checkout_core::{Address, CoreError, Product};
    use checkout_db::DbConfig;
    use checkout_gateway::{
        signature, GatewayError, GatewayResult, RedirectResponse,
    };
    use std::time::Duration;

    /// Scripted provider: succeeds with a fixed URL or fails on demand.
    struct ScriptedProvider {
        fail: bool,
    }

    #[async_trait]
    impl ProviderClient for ScriptedProvider {
        async fn request_redirect(
            &self,
            request: &RedirectRequest,
        ) -> GatewayResult<RedirectResponse> {
            if self.fail {
                return Err(GatewayError::Provider("scripted failure".to_string()));
            }
            Ok(RedirectResponse {
                redirect_url: format!(
                    "https://provider.example/pay/{}",
                    request.merchant_reference
                ),
            })
        }
    }

    fn gateway_config() -> GatewayConfig {
        GatewayConfig {
            merchant_id: "merchant-1".to_string(),
            secret: "shared-secret".to_string(),
            base_url: "https://provider.example".to_string(),
            return_url: "https://shop.example/payment/return".to_string(),
            min_amount_cents: 100,
            max_amount_cents: 100_000_000,
            request_timeout: Duration::from_secs(5),
        }
    }

    async fn service(fail_provider: bool) -> CheckoutService {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        CheckoutService::new(
            db,
            Arc::new(ScriptedProvider {
                fail: fail_provider,
            }),
            gateway_config(),
        )
    }

    /// Seeds a product, an address and a filled cart; returns the cart id.
    async fn seed(svc: &CheckoutService) -> String {
        let now = Utc::now();
        svc.db
            .products()
            .insert(&Product {
                id: "p1".to_string(),
                name: "Widget".to_string(),
                base_price_cents: 5_000,
                stock_quantity: 5,
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
        svc.db
            .addresses()
            .insert(&Address {
                id: "a1".to_string(),
                user_id: "user-1".to_string(),
                line1: "1 Main St".to_string(),
                city: "Springfield".to_string(),
                country: "US".to_string(),
                created_at: now,
            })
            .await
            .unwrap();
        let cart = svc.db.carts().get_or_create("user-1").await.unwrap();
        svc.db.carts().add_item(&cart.id, "p1", 3).await.unwrap();
        cart.id
    }

    fn request(cart_id: &str, method: PaymentMethod) -> CreateOrderRequest {
        CreateOrderRequest {
            user_id: "user-1".to_string(),
            cart_id: cart_id.to_string(),
            address_id: "a1".to_string(),
            payment_method: method,
            payer_ip: "203.0.113.7".to_string(),
        }
    }

    fn signed_callback(
        merchant_ref: &str,
        response_code: &str,
        txn_status: &str,
        secret: &str,
    ) -> BTreeMap<String, String> {
        let mut fields = BTreeMap::new();
        fields.insert("merchant_ref".to_string(), merchant_ref.to_string());
        fields.insert("transaction_id".to_string(), "TXN-42".to_string());
        fields.insert("response_code".to_string(), response_code.to_string());
        fields.insert("txn_status".to_string(), txn_status.to_string());

        let sig = signature::sign(
            fields.iter().map(|(k, v)| (k.as_str(), v.as_str())),
            secret,
        );
        fields.insert("signature".to_string(), sig);
        fields
    }

    #[tokio::test]
    async fn test_end_to_end_checkout() {
        // 3 × $50 widgets: stock 5 → 2, sum $150, 15 points
        let svc = service(false).await;
        let cart_id = seed(&svc).await;

        let outcome = svc
            .create_order(&request(&cart_id, PaymentMethod::Online), Utc::now())
            .await
            .unwrap();

        assert_eq!(outcome.order.sum_cents, 15_000);
        assert_eq!(outcome.items.len(), 1);
        assert_eq!(outcome.items[0].price_cents, 5_000);
        assert_eq!(outcome.address.id, "a1");
        assert_eq!(outcome.payment.status, PaymentStatus::Pending);
        assert!(outcome.redirect_url.is_some());

        let stock = svc
            .db
            .products()
            .get_required("p1")
            .await
            .unwrap()
            .stock_quantity;
        assert_eq!(stock, 2);

        assert_eq!(svc.points_balance("user-1").await.unwrap(), 15);

        // Cart is gone; a second checkout has nothing to convert.
        let err = svc
            .create_order(&request(&cart_id, PaymentMethod::Online), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::Db(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_provider_failure_keeps_order_without_payment() {
        let svc = service(true).await;
        let cart_id = seed(&svc).await;

        let err = svc
            .create_order(&request(&cart_id, PaymentMethod::Online), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::Gateway(GatewayError::Provider(_))));

        // Order committed, stock gone, points awarded, no payment row.
        let orders = svc.orders_for_user("user-1").await.unwrap();
        assert_eq!(orders.len(), 1);
        assert!(svc
            .db
            .payments()
            .get_by_order(&orders[0].id)
            .await
            .unwrap()
            .is_none());
        assert_eq!(
            svc.db
                .products()
                .get_required("p1")
                .await
                .unwrap()
                .stock_quantity,
            2
        );
    }

    #[tokio::test]
    async fn test_callback_settles_online_payment() {
        let svc = service(false).await;
        let cart_id = seed(&svc).await;
        let outcome = svc
            .create_order(&request(&cart_id, PaymentMethod::Online), Utc::now())
            .await
            .unwrap();

        let settled = svc
            .handle_callback(signed_callback(
                &outcome.payment.id,
                "000",
                "completed",
                "shared-secret",
            ))
            .await
            .unwrap();
        assert_eq!(settled.status, PaymentStatus::Completed);
        assert_eq!(settled.transaction_id.as_deref(), Some("TXN-42"));

        // Replay with a contradictory result is a no-op.
        let replayed = svc
            .handle_callback(signed_callback(
                &outcome.payment.id,
                "051",
                "declined",
                "shared-secret",
            ))
            .await
            .unwrap();
        assert_eq!(replayed.status, PaymentStatus::Completed);
    }

    #[tokio::test]
    async fn test_invalid_signature_never_moves_payment() {
        let svc = service(false).await;
        let cart_id = seed(&svc).await;
        let outcome = svc
            .create_order(&request(&cart_id, PaymentMethod::Online), Utc::now())
            .await
            .unwrap();

        // Success-shaped payload signed with the wrong secret.
        let acked = svc
            .handle_callback(signed_callback(
                &outcome.payment.id,
                "000",
                "completed",
                "wrong-secret",
            ))
            .await
            .unwrap();
        assert_eq!(acked.status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn test_failed_callback_settles_as_failed() {
        let svc = service(false).await;
        let cart_id = seed(&svc).await;
        let outcome = svc
            .create_order(&request(&cart_id, PaymentMethod::Online), Utc::now())
            .await
            .unwrap();

        let settled = svc
            .handle_callback(signed_callback(
                &outcome.payment.id,
                "051",
                "declined",
                "shared-secret",
            ))
            .await
            .unwrap();
        assert_eq!(settled.status, PaymentStatus::Failed);
    }

    #[tokio::test]
    async fn test_cod_settled_by_operator_not_callback() {
        let svc = service(false).await;
        let cart_id = seed(&svc).await;
        let outcome = svc
            .create_order(&request(&cart_id, PaymentMethod::CashOnDelivery), Utc::now())
            .await
            .unwrap();
        assert!(outcome.redirect_url.is_none());

        // A callback cannot move a COD payment.
        let acked = svc
            .handle_callback(signed_callback(
                &outcome.payment.id,
                "000",
                "completed",
                "shared-secret",
            ))
            .await
            .unwrap();
        assert_eq!(acked.status, PaymentStatus::Pending);

        // The operator can.
        let settled = svc.complete_cod_payment(&outcome.order.id).await.unwrap();
        assert_eq!(settled.status, PaymentStatus::Completed);

        // But only once.
        let err = svc.fail_cod_payment(&outcome.order.id).await.unwrap_err();
        assert!(matches!(err, CheckoutError::PaymentAlreadySettled { .. }));
    }

    #[tokio::test]
    async fn test_cod_action_rejects_online_payment() {
        let svc = service(false).await;
        let cart_id = seed(&svc).await;
        let outcome = svc
            .create_order(&request(&cart_id, PaymentMethod::Online), Utc::now())
            .await
            .unwrap();

        let err = svc.complete_cod_payment(&outcome.order.id).await.unwrap_err();
        assert!(matches!(err, CheckoutError::NotCashOnDelivery { .. }));
    }

    #[tokio::test]
    async fn test_empty_cart_rejected() {
        let svc = service(false).await;
        let cart_id = seed(&svc).await;

        // Empty the cart without deleting it.
        svc.db.carts().remove_item(&cart_id, "p1").await.unwrap();

        let err = svc
            .create_order(&request(&cart_id, PaymentMethod::Online), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::Core(CoreError::EmptyCart(_))));
    }

    #[tokio::test]
    async fn test_foreign_address_rejected() {
        let svc = service(false).await;
        let cart_id = seed(&svc).await;
        svc.db
            .addresses()
            .insert(&Address {
                id: "a2".to_string(),
                user_id: "user-2".to_string(),
                line1: "9 Other St".to_string(),
                city: "Shelbyville".to_string(),
                country: "US".to_string(),
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        let mut req = request(&cart_id, PaymentMethod::Online);
        req.address_id = "a2".to_string();

        let err = svc.create_order(&req, Utc::now()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Db(DbError::NotFound { .. })));

        // Nothing was committed.
        assert_eq!(
            svc.db
                .products()
                .get_required("p1")
                .await
                .unwrap()
                .stock_quantity,
            5
        );
    }

    #[tokio::test]
    async fn test_order_lifecycle() {
        let svc = service(false).await;
        let cart_id = seed(&svc).await;
        let outcome = svc
            .create_order(&request(&cart_id, PaymentMethod::CashOnDelivery), Utc::now())
            .await
            .unwrap();

        let updated = svc
            .update_status(&outcome.order.id, Some(OrderStatus::Shipped), Some("TRK-9"))
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Shipped);

        let view = svc.get_order(&outcome.order.id).await.unwrap();
        assert_eq!(view.items.len(), 1);
        assert!(view.payment.is_some());

        svc.delete_order(&outcome.order.id).await.unwrap();
        let err = svc.get_order(&outcome.order.id).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Db(DbError::NotFound { .. })));

        // Points survive the delete.
        assert_eq!(svc.points_balance("user-1").await.unwrap(), 15);
    }

    #[tokio::test]
    async fn test_rule_prices_snapshot_into_order() {
        use chrono::TimeZone;

        let svc = service(false).await;
        let cart_id = seed(&svc).await;

        // Global weekend rule: ×0.9, priority 5.
        svc.db
            .pricing_rules()
            .insert(&PricingRule {
                id: "weekend-sale".to_string(),
                applies_to_all: true,
                special_day: Some("weekend".to_string()),
                start_time: None,
                end_time: None,
                start_date: None,
                end_date: None,
                condition_filter: None,
                multiplier_bps: 9_000,
                fixed_price_cents: None,
                priority: 5,
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        // 2026-08-22 is a Saturday, 2026-08-26 a Wednesday.
        let saturday = Utc.with_ymd_and_hms(2026, 8, 22, 10, 0, 0).unwrap();
        let wednesday = Utc.with_ymd_and_hms(2026, 8, 26, 10, 0, 0).unwrap();

        assert_eq!(svc.resolve_price("p1", saturday).await.unwrap().cents(), 4_500);
        assert_eq!(svc.resolve_price("p1", wednesday).await.unwrap().cents(), 5_000);

        let rules = svc.applicable_rules("p1", saturday).await.unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].id, "weekend-sale");
        assert!(svc.applicable_rules("p1", wednesday).await.unwrap().is_empty());

        // A whole checkout pinned to the Saturday instant snapshots the
        // weekend price into the order items.
        let outcome = svc
            .create_order(&request(&cart_id, PaymentMethod::CashOnDelivery), saturday)
            .await
            .unwrap();
        assert_eq!(outcome.items[0].price_cents, 4_500);
        assert_eq!(outcome.order.sum_cents, 13_500);
    }

    #[tokio::test]
    async fn test_foreign_cart_rejected() {
        let svc = service(false).await;
        let cart_id = seed(&svc).await;

        let mut req = request(&cart_id, PaymentMethod::Online);
        req.user_id = "user-2".to_string();

        // Someone else's cart reads as absent; nothing is committed.
        let err = svc.create_order(&req, Utc::now()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Db(DbError::NotFound { .. })));
        assert_eq!(
            svc.db
                .products()
                .get_required("p1")
                .await
                .unwrap()
                .stock_quantity,
            5
        );
    }

    #[tokio::test]
    async fn test_redeem_through_service() {
        let svc = service(false).await;
        let cart_id = seed(&svc).await;
        svc.create_order(&request(&cart_id, PaymentMethod::CashOnDelivery), Utc::now())
            .await
            .unwrap();

        svc.redeem_points("user-1", 10, "discount").await.unwrap();
        assert_eq!(svc.points_balance("user-1").await.unwrap(), 5);

        let err = svc.redeem_points("user-1", 6, "discount").await.unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Core(CoreError::InsufficientPoints { .. })
        ));

        let history = svc.points_history("user-1").await.unwrap();
        assert_eq!(history.len(), 2);
    }
}
