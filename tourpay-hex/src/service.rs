//! Payment Application Service
//!
//! Orchestrates the Payment aggregate, the repository port and the gateway
//! port. This is the only place where a payment's status changes.
//!
//! Every mutating operation re-reads the payment, asks the state machine
//! whether the move is legal, calls the gateway at most once, and writes the
//! result back with an optimistic version check.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use tourpay_types::domain::{
    MAX_INSTALLMENTS, MIN_INSTALLMENTS, can_cancel, can_capture, can_refund,
};
use tourpay_types::{
    AppError, AuthorizeCardPaymentRequest, CaptureMode, CardDetails, ClientId, CompanyId,
    CreatePaymentRequest, GatewayError, GatewayNotification, Money, NewPayment,
    NotificationOutcome, OrderIntent, OrderResult, Payer, Payment, PaymentGateway, PaymentId,
    PaymentIntent, PaymentMethod, PaymentRepository, PaymentResult, PaymentStatus,
    PixPaymentRequest, RefundRequest, TicketPaymentRequest, UpdatePaymentRequest,
    is_legal_transition,
};

/// A PIX payment plus what the payer needs to complete it.
///
/// QR data is only present on the call that created the gateway payment.
#[derive(Debug, Clone)]
pub struct PixCheckout {
    pub payment: Payment,
    pub qr_code: Option<String>,
    pub qr_code_base64: Option<String>,
    pub ticket_url: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Application service for payment operations.
///
/// Generic over the repository and the gateway so both can be swapped
/// (Postgres vs SQLite, real gateway vs test double) without code changes.
pub struct PaymentService<R: PaymentRepository, G: PaymentGateway> {
    repo: R,
    gateway: G,
}

impl<R: PaymentRepository, G: PaymentGateway> PaymentService<R, G> {
    pub fn new(repo: R, gateway: G) -> Self {
        Self { repo, gateway }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Creation and authorization
    // ─────────────────────────────────────────────────────────────────────────────

    /// Registers a pending payment. The gateway is not contacted.
    #[tracing::instrument(skip(self, req), fields(client_id = %req.client_id, method = %req.payment_method))]
    pub async fn create_payment(&self, req: CreatePaymentRequest) -> Result<Payment, AppError> {
        let payment = Payment::new(NewPayment {
            client_id: req.client_id,
            company_id: req.company_id,
            amount: Money::new(req.amount, req.currency)?,
            payment_method: req.payment_method,
            installment_count: req.installment_count,
            description: req.description,
        })?;

        let payment = self.repo.create(&payment).await?;
        tracing::info!(payment_id = %payment.id(), "payment created");
        Ok(payment)
    }

    /// Authorizes a card payment by creating a gateway order.
    ///
    /// A payment that already has a gateway order is returned unchanged, so
    /// retrying this call never creates a second order.
    #[tracing::instrument(skip(self, req), fields(client_id = %req.client_id, payment_id = tracing::field::Empty))]
    pub async fn authorize_card_payment(
        &self,
        req: AuthorizeCardPaymentRequest,
    ) -> Result<Payment, AppError> {
        let amount = Money::new(req.amount, req.currency)?;
        validate_card_request(&req)?;

        let mut payment = self
            .load_or_create(
                req.payment_id,
                NewPayment {
                    client_id: req.client_id,
                    company_id: req.company_id,
                    amount,
                    payment_method: req.payment_method,
                    installment_count: req.installment_count,
                    description: req.description.clone(),
                },
            )
            .await?;
        tracing::Span::current().record("payment_id", tracing::field::display(payment.id()));

        if payment.gateway_order_id().is_some() {
            tracing::info!(payment_id = %payment.id(), "order already exists, returning payment as is");
            return Ok(payment);
        }
        ensure_pending(&payment)?;

        let intent = OrderIntent {
            external_reference: payment.id().to_string(),
            idempotency_key: format!("{}:authorize", payment.id()),
            amount: amount.amount(),
            currency: amount.currency(),
            payment_method: payment.payment_method(),
            installments: payment.installment_count(),
            card_token: req.card_token,
            issuer_id: req.issuer_id.clone(),
            payer: req.payer,
            items: req.items,
            capture_mode: if req.capture {
                CaptureMode::Automatic
            } else {
                CaptureMode::Manual
            },
            description: payment.description.clone(),
            metadata: metadata(&payment),
        };

        let order = match self.gateway.create_order(&intent).await {
            Ok(order) => order,
            Err(err) => return Err(self.fail_first_contact(payment, err).await),
        };

        apply_order(&mut payment, &order, req.issuer_id)?;
        let saved = self.save_after_gateway(&payment, "authorize").await?;
        tracing::info!(
            payment_id = %saved.id(),
            order_id = %order.id,
            status = %saved.status(),
            "card payment authorized"
        );
        Ok(saved)
    }

    /// Starts a PIX payment and returns the QR payload.
    #[tracing::instrument(skip(self, req), fields(client_id = %req.client_id, payment_id = tracing::field::Empty))]
    pub async fn start_pix_payment(&self, req: PixPaymentRequest) -> Result<PixCheckout, AppError> {
        let amount = Money::new(req.amount, req.currency)?;
        validate_payer(&req.payer)?;

        let mut payment = self
            .load_or_create(
                req.payment_id,
                NewPayment {
                    client_id: req.client_id,
                    company_id: req.company_id,
                    amount,
                    payment_method: PaymentMethod::Pix,
                    installment_count: 1,
                    description: req.description,
                },
            )
            .await?;
        tracing::Span::current().record("payment_id", tracing::field::display(payment.id()));

        if payment.gateway_payment_id().is_some() {
            return Ok(PixCheckout {
                payment,
                qr_code: None,
                qr_code_base64: None,
                ticket_url: None,
                expires_at: None,
            });
        }
        ensure_pending(&payment)?;

        let intent = direct_intent(&payment, req.payer, "pix");
        let pix = match self.gateway.create_pix_payment(&intent).await {
            Ok(pix) => pix,
            Err(err) => return Err(self.fail_first_contact(payment, err).await),
        };

        apply_direct_payment(&mut payment, &pix.payment)?;
        let saved = self.save_after_gateway(&payment, "pix").await?;
        tracing::info!(payment_id = %saved.id(), gateway_payment_id = %pix.payment.id, "pix payment started");

        Ok(PixCheckout {
            payment: saved,
            qr_code: pix.qr_code,
            qr_code_base64: pix.qr_code_base64,
            ticket_url: pix.ticket_url,
            expires_at: pix.expires_at,
        })
    }

    /// Starts a boleto or pec payment.
    #[tracing::instrument(skip(self, req), fields(client_id = %req.client_id, method = %req.payment_method, payment_id = tracing::field::Empty))]
    pub async fn start_ticket_payment(
        &self,
        req: TicketPaymentRequest,
    ) -> Result<Payment, AppError> {
        if !req.payment_method.is_ticket() {
            return Err(AppError::Validation(format!(
                "{} is not a ticket payment method",
                req.payment_method
            )));
        }
        let amount = Money::new(req.amount, req.currency)?;
        validate_payer(&req.payer)?;

        let mut payment = self
            .load_or_create(
                req.payment_id,
                NewPayment {
                    client_id: req.client_id,
                    company_id: req.company_id,
                    amount,
                    payment_method: req.payment_method,
                    installment_count: 1,
                    description: req.description,
                },
            )
            .await?;
        tracing::Span::current().record("payment_id", tracing::field::display(payment.id()));

        if payment.gateway_payment_id().is_some() {
            return Ok(payment);
        }
        ensure_pending(&payment)?;

        let intent = direct_intent(&payment, req.payer, "ticket");
        let result = match self.gateway.create_payment(&intent).await {
            Ok(result) => result,
            Err(err) => return Err(self.fail_first_contact(payment, err).await),
        };

        apply_direct_payment(&mut payment, &result)?;
        let saved = self.save_after_gateway(&payment, "ticket").await?;
        tracing::info!(payment_id = %saved.id(), gateway_payment_id = %result.id, "ticket payment started");
        Ok(saved)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Capture / cancel / refund
    // ─────────────────────────────────────────────────────────────────────────────

    /// Captures an authorized payment. Capturing twice is a no-op.
    #[tracing::instrument(skip(self))]
    pub async fn capture(&self, id: PaymentId) -> Result<Payment, AppError> {
        let mut payment = self.load(id).await?;

        if payment.captured() {
            tracing::info!(payment_id = %id, "payment already captured");
            return Ok(payment);
        }
        if !can_capture(payment.status()) {
            return Err(AppError::Conflict(format!(
                "payment {id} cannot be captured in status {}",
                payment.status()
            )));
        }
        let order_id = payment
            .gateway_order_id()
            .ok_or_else(|| AppError::Conflict(format!("payment {id} has no gateway order")))?
            .to_string();

        let order = self
            .gateway
            .capture_order(&order_id, &format!("{id}:capture"))
            .await
            .inspect_err(|e| tracing::warn!(payment_id = %id, error = %e, "capture failed"))?;

        payment.capture(Utc::now())?;
        if let Some(detail) = order.effective_status_detail() {
            payment.status_detail = Some(detail.to_string());
        }

        let saved = self.save_after_gateway(&payment, "capture").await?;
        tracing::info!(payment_id = %id, "payment captured");
        Ok(saved)
    }

    /// Cancels a payment that has not settled.
    ///
    /// A payment the gateway never saw is cancelled locally.
    #[tracing::instrument(skip(self))]
    pub async fn cancel(&self, id: PaymentId) -> Result<Payment, AppError> {
        let mut payment = self.load(id).await?;

        if !can_cancel(payment.status()) {
            return Err(AppError::Conflict(format!(
                "payment {id} cannot be cancelled in status {}",
                payment.status()
            )));
        }

        let detail = if let Some(order_id) = payment.gateway_order_id() {
            let order = self
                .gateway
                .cancel_order(order_id, &format!("{id}:cancel"))
                .await
                .inspect_err(|e| tracing::warn!(payment_id = %id, error = %e, "cancel failed"))?;
            order.effective_status_detail().map(String::from)
        } else if let Some(gateway_payment_id) = payment.gateway_payment_id() {
            let result = self
                .gateway
                .cancel_payment(gateway_payment_id)
                .await
                .inspect_err(|e| tracing::warn!(payment_id = %id, error = %e, "cancel failed"))?;
            result.status_detail
        } else {
            tracing::debug!(payment_id = %id, "payment never reached the gateway, cancelling locally");
            None
        };

        payment.transition_to(PaymentStatus::Cancelled, Utc::now())?;
        if detail.is_some() {
            payment.status_detail = detail;
        }

        let saved = self.save_after_gateway(&payment, "cancel").await?;
        tracing::info!(payment_id = %id, "payment cancelled");
        Ok(saved)
    }

    /// Refunds part or all of a settled payment.
    ///
    /// Without an amount, everything not yet refunded is returned.
    #[tracing::instrument(skip(self, req))]
    pub async fn refund(&self, id: PaymentId, req: RefundRequest) -> Result<Payment, AppError> {
        let payment = self.load(id).await?;

        if !can_refund(payment.status()) {
            return Err(AppError::Conflict(format!(
                "payment {id} cannot be refunded in status {}",
                payment.status()
            )));
        }

        let refunded_before = payment.refunded_amount();
        let amount = req.amount.unwrap_or_else(|| payment.refundable_amount());

        // Apply to a copy first so an invalid amount never reaches the gateway.
        let mut refunded = payment.clone();
        refunded.record_refund(amount, Utc::now()).map_err(|e| {
            AppError::Validation(e.to_string())
        })?;

        let whole = refunded_before.is_zero() && amount == payment.amount().amount();
        let gateway_amount = if whole { None } else { Some(amount) };
        let key = format!("{id}:refund:{refunded_before}");

        if let Some(order_id) = payment.gateway_order_id() {
            self.gateway
                .refund_order(order_id, gateway_amount, &key)
                .await
                .inspect_err(|e| tracing::warn!(payment_id = %id, error = %e, "refund failed"))?;
        } else if let Some(gateway_payment_id) = payment.gateway_payment_id() {
            self.gateway
                .refund_payment(gateway_payment_id, gateway_amount, &key)
                .await
                .inspect_err(|e| tracing::warn!(payment_id = %id, error = %e, "refund failed"))?;
        } else {
            return Err(AppError::Conflict(format!(
                "payment {id} has no gateway reference to refund"
            )));
        }

        let saved = self.save_after_gateway(&refunded, "refund").await?;
        tracing::info!(
            payment_id = %id,
            %amount,
            refunded_total = %saved.refunded_amount(),
            status = %saved.status(),
            "refund recorded"
        );
        Ok(saved)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Gateway-driven status changes
    // ─────────────────────────────────────────────────────────────────────────────

    /// Applies an asynchronous gateway notification.
    ///
    /// The notification only names the payment; its status is re-read from
    /// the gateway. Unknown payments are ignored, nothing is created.
    #[tracing::instrument(skip(self, notification), fields(gateway_payment_id = %notification.data.id))]
    pub async fn handle_notification(
        &self,
        notification: GatewayNotification,
    ) -> Result<NotificationOutcome, AppError> {
        if !notification.is_payment_event() {
            tracing::debug!(topic = ?notification.topic, "ignoring non-payment notification");
            return Ok(NotificationOutcome::Ignored);
        }

        let gateway_payment_id = notification.data.id;
        let Some(payment) = self
            .repo
            .find_by_gateway_payment_id(&gateway_payment_id)
            .await?
        else {
            tracing::info!(%gateway_payment_id, "notification for unknown payment ignored");
            return Ok(NotificationOutcome::Ignored);
        };

        let remote = self.gateway.get_payment(&gateway_payment_id).await?;
        let (outcome, _) = self
            .apply_reported_status(payment, remote.mapped_status(), remote.status_detail)
            .await?;
        Ok(outcome)
    }

    /// Re-reads the gateway's view of a payment and applies it.
    ///
    /// The recovery path after a failed or unknown-outcome capture, cancel
    /// or refund.
    #[tracing::instrument(skip(self))]
    pub async fn sync_status(&self, id: PaymentId) -> Result<Payment, AppError> {
        let mut payment = self.load(id).await?;

        let (reported, detail) = if let Some(order_id) = payment.gateway_order_id() {
            let order = self.gateway.get_order(order_id).await?;
            if payment.gateway_payment_id().is_none() {
                if let Some(primary) = order.primary_payment() {
                    payment.assign_gateway_payment(&primary.id)?;
                }
            }
            (
                order.mapped_status(),
                order.effective_status_detail().map(String::from),
            )
        } else if let Some(gateway_payment_id) = payment.gateway_payment_id() {
            let remote = self.gateway.get_payment(gateway_payment_id).await?;
            (remote.mapped_status(), remote.status_detail)
        } else {
            tracing::debug!(payment_id = %id, "payment never reached the gateway, nothing to sync");
            return Ok(payment);
        };

        match self.apply_reported_status(payment, reported, detail).await? {
            (NotificationOutcome::Rejected { current, .. }, _) => Err(AppError::Conflict(format!(
                "gateway reports {reported} for payment {id}, which is not reachable from {current}"
            ))),
            (_, payment) => Ok(payment),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Queries and edits
    // ─────────────────────────────────────────────────────────────────────────────

    pub async fn get_payment(&self, id: PaymentId) -> Result<Payment, AppError> {
        self.load(id).await
    }

    pub async fn list_by_client(&self, client_id: ClientId) -> Result<Vec<Payment>, AppError> {
        self.repo.list_by_client(client_id).await.map_err(Into::into)
    }

    pub async fn list_by_company(&self, company_id: CompanyId) -> Result<Vec<Payment>, AppError> {
        self.repo.list_by_company(company_id).await.map_err(Into::into)
    }

    /// Applies a typed patch. Installments and description are frozen once
    /// the gateway has seen the payment; status is never patchable.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update_payment(
        &self,
        id: PaymentId,
        patch: UpdatePaymentRequest,
    ) -> Result<Payment, AppError> {
        if patch.is_empty() {
            return Err(AppError::Validation("nothing to update".into()));
        }

        let mut payment = self.load(id).await?;

        if let Some(count) = patch.installment_count {
            payment.set_installment_count(count)?;
        }
        if let Some(description) = patch.description {
            if !payment.is_editable() {
                return Err(AppError::Conflict(format!(
                    "payment {id} can no longer be edited (status {})",
                    payment.status()
                )));
            }
            payment.description = Some(description);
        }
        if let Some(name) = patch.cardholder_name {
            payment.set_cardholder_name(name)?;
        }

        self.repo.update(&payment).await.map_err(Into::into)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────────────

    async fn load(&self, id: PaymentId) -> Result<Payment, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Payment {id}")))
    }

    /// Loads the referenced payment (which must match the request) or
    /// persists a new pending one.
    async fn load_or_create(
        &self,
        existing: Option<PaymentId>,
        draft: NewPayment,
    ) -> Result<Payment, AppError> {
        match existing {
            Some(id) => {
                let payment = self.load(id).await?;
                if payment.client_id() != draft.client_id
                    || payment.company_id() != draft.company_id
                    || payment.amount() != draft.amount
                    || payment.payment_method() != draft.payment_method
                {
                    return Err(AppError::Validation(format!(
                        "payment {id} does not match the request"
                    )));
                }
                Ok(payment)
            }
            None => {
                let payment = Payment::new(draft)?;
                let payment = self.repo.create(&payment).await?;
                tracing::info!(payment_id = %payment.id(), "payment created");
                Ok(payment)
            }
        }
    }

    /// Handles a failed first gateway call. A definitive rejection moves the
    /// payment to `rejected`; anything else leaves it pending for a retry.
    async fn fail_first_contact(&self, mut payment: Payment, err: GatewayError) -> AppError {
        if let GatewayError::Rejected {
            message, causes, ..
        } = &err
        {
            let detail = match causes.first() {
                Some(cause) if !cause.code.is_empty() => format!("{message} ({})", cause.code),
                _ => message.clone(),
            };
            payment.status_detail = Some(detail);

            match payment.transition_to(PaymentStatus::Rejected, Utc::now()) {
                Ok(_) => {
                    if let Err(save_err) = self.repo.update(&payment).await {
                        tracing::error!(
                            payment_id = %payment.id(),
                            error = %save_err,
                            "could not record gateway rejection"
                        );
                    }
                }
                Err(e) => tracing::warn!(payment_id = %payment.id(), error = %e, "rejection not applied"),
            }
            tracing::warn!(payment_id = %payment.id(), error = %err, "gateway rejected payment");
        } else {
            tracing::warn!(
                payment_id = %payment.id(),
                error = %err,
                retryable = err.is_retryable(),
                "gateway call failed, payment left pending"
            );
        }
        err.into()
    }

    /// Writes a payment whose new state the gateway already holds.
    ///
    /// A failure here means local and gateway state disagree until
    /// `sync_status` runs, so it is logged loudly.
    async fn save_after_gateway(
        &self,
        payment: &Payment,
        operation: &'static str,
    ) -> Result<Payment, AppError> {
        self.repo.update(payment).await.map_err(|e| {
            tracing::error!(
                payment_id = %payment.id(),
                operation,
                error = %e,
                "gateway call succeeded but the payment could not be saved"
            );
            AppError::from(e)
        })
    }

    /// Moves a payment to the status the gateway reports, if legal.
    async fn apply_reported_status(
        &self,
        mut payment: Payment,
        reported: PaymentStatus,
        detail: Option<String>,
    ) -> Result<(NotificationOutcome, Payment), AppError> {
        let payment_id = payment.id();
        let current = payment.status();

        if current == reported {
            return Ok((
                NotificationOutcome::Unchanged {
                    payment_id,
                    status: current,
                },
                payment,
            ));
        }

        if !is_legal_transition(current, reported) {
            tracing::warn!(
                %payment_id,
                %current,
                %reported,
                "gateway reported a status not reachable from the current one"
            );
            return Ok((
                NotificationOutcome::Rejected {
                    payment_id,
                    current,
                    reported,
                },
                payment,
            ));
        }

        payment.apply_gateway_status(reported, Utc::now())?;
        if detail.is_some() {
            payment.status_detail = detail;
        }

        let saved = self.repo.update(&payment).await?;
        tracing::info!(%payment_id, from = %current, to = %reported, "status updated from gateway");
        Ok((
            NotificationOutcome::Applied {
                payment_id,
                from: current,
                to: reported,
            },
            saved,
        ))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Validation and mapping
// ─────────────────────────────────────────────────────────────────────────────

fn validate_card_request(req: &AuthorizeCardPaymentRequest) -> Result<(), AppError> {
    if !req.payment_method.is_card() {
        return Err(AppError::Validation(format!(
            "{} is not a card payment method",
            req.payment_method
        )));
    }
    if !(MIN_INSTALLMENTS..=MAX_INSTALLMENTS).contains(&req.installment_count) {
        return Err(AppError::Validation(format!(
            "installment count must be between {MIN_INSTALLMENTS} and {MAX_INSTALLMENTS}, got {}",
            req.installment_count
        )));
    }
    if req.card_token.trim().is_empty() {
        return Err(AppError::Validation("card token is required".into()));
    }
    validate_payer(&req.payer)?;

    if !req.items.is_empty() {
        if req
            .items
            .iter()
            .any(|i| i.quantity == 0 || i.unit_price <= Decimal::ZERO)
        {
            return Err(AppError::Validation(
                "line items need a positive quantity and unit price".into(),
            ));
        }
        let mut total: Option<Money> = None;
        for item in &req.items {
            let line = Money::new(item.total(), req.currency)?;
            total = Some(match total {
                Some(sum) => sum.checked_add(line)?,
                None => line,
            });
        }
        if let Some(total) = total.filter(|t| t.amount() != req.amount) {
            return Err(AppError::Validation(format!(
                "line items add up to {}, payment amount is {}",
                total.amount(),
                req.amount
            )));
        }
    }
    Ok(())
}

fn validate_payer(payer: &Payer) -> Result<(), AppError> {
    let email = payer.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::Validation("a valid payer email is required".into()));
    }
    Ok(())
}

fn ensure_pending(payment: &Payment) -> Result<(), AppError> {
    if payment.status() != PaymentStatus::Pending {
        return Err(AppError::Conflict(format!(
            "payment {} is {} and cannot be sent to the gateway",
            payment.id(),
            payment.status()
        )));
    }
    Ok(())
}

fn metadata(payment: &Payment) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("payment_id".to_string(), payment.id().to_string()),
        ("client_id".to_string(), payment.client_id().to_string()),
        ("company_id".to_string(), payment.company_id().to_string()),
    ])
}

fn direct_intent(payment: &Payment, payer: Payer, operation: &str) -> PaymentIntent {
    PaymentIntent {
        external_reference: payment.id().to_string(),
        idempotency_key: format!("{}:{operation}", payment.id()),
        amount: payment.amount().amount(),
        currency: payment.amount().currency(),
        payment_method: payment.payment_method(),
        installments: payment.installment_count(),
        payer,
        description: payment.description.clone(),
        metadata: metadata(payment),
    }
}

/// Records a freshly created order on the payment.
fn apply_order(
    payment: &mut Payment,
    order: &OrderResult,
    requested_issuer: Option<String>,
) -> Result<(), AppError> {
    payment.assign_gateway_order(&order.id)?;

    if let Some(primary) = order.primary_payment() {
        payment.assign_gateway_payment(&primary.id)?;

        if let Some(card) = &primary.card {
            if let (Some(last_four), Some(first_six)) =
                (&card.last_four_digits, &card.first_six_digits)
            {
                let issuer = primary.issuer_id.clone().or(requested_issuer);
                match CardDetails::new(
                    last_four.as_str(),
                    first_six.as_str(),
                    issuer,
                    card.cardholder_name.clone(),
                ) {
                    Ok(details) => payment.record_card(details)?,
                    Err(e) => tracing::warn!(
                        payment_id = %payment.id(),
                        error = %e,
                        "ignoring malformed card snapshot from gateway"
                    ),
                }
            }
        }
    }

    payment.status_detail = order.effective_status_detail().map(String::from);
    adopt_created_status(payment, order.mapped_status())
}

/// Records a freshly created direct (PIX, boleto, pec) payment.
fn apply_direct_payment(payment: &mut Payment, result: &PaymentResult) -> Result<(), AppError> {
    payment.assign_gateway_payment(&result.id)?;
    payment.status_detail = result.status_detail.clone();
    adopt_created_status(payment, result.mapped_status())
}

/// Takes the status of an object the gateway just created.
///
/// The gateway reference must be saved whatever the status is, so a status
/// the payment cannot reach is noted in `status_detail` instead of failing;
/// `sync_status` picks it up later.
fn adopt_created_status(payment: &mut Payment, reported: PaymentStatus) -> Result<(), AppError> {
    let current = payment.status();
    if current != reported && !is_legal_transition(current, reported) {
        tracing::warn!(
            payment_id = %payment.id(),
            %current,
            %reported,
            "gateway created the payment in a status not reachable locally"
        );
        payment.status_detail = Some(format!("gateway reported {reported}"));
        return Ok(());
    }
    payment.apply_gateway_status(reported, Utc::now())?;
    Ok(())
}
