//! SQLite repository integration tests.

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use tourpay_types::{
        CardDetails, ClientId, CompanyId, Currency, Money, NewPayment, Payment, PaymentId,
        PaymentMethod, PaymentRepository, PaymentStatus, RepoError,
    };

    use crate::SqliteRepo;

    async fn setup_repo() -> SqliteRepo {
        SqliteRepo::new("sqlite::memory:").await.unwrap()
    }

    fn new_payment(client_id: ClientId, company_id: CompanyId, method: PaymentMethod) -> Payment {
        Payment::new(NewPayment {
            client_id,
            company_id,
            amount: Money::new(dec!(150.00), Currency::BRL).unwrap(),
            payment_method: method,
            installment_count: 1,
            description: Some("Sugarloaf sunset tour".into()),
        })
        .unwrap()
    }

    fn card_payment() -> Payment {
        new_payment(ClientId::new(), CompanyId::new(), PaymentMethod::CreditCard)
    }

    #[tokio::test]
    async fn test_create_and_find_by_id() {
        let repo = setup_repo().await;
        let payment = card_payment();

        let created = repo.create(&payment).await.unwrap();
        assert_eq!(created.version(), 0);

        let found = repo.find_by_id(payment.id()).await.unwrap().unwrap();
        assert_eq!(found.id(), payment.id());
        assert_eq!(found.status(), PaymentStatus::Pending);
        assert_eq!(found.amount().amount(), dec!(150.00));
        assert_eq!(found.amount().currency(), Currency::BRL);
        assert_eq!(found.payment_method(), PaymentMethod::CreditCard);
        assert_eq!(found.description.as_deref(), Some("Sugarloaf sunset tour"));
        assert!(found.card().is_none());
        assert!(!found.captured());
    }

    #[tokio::test]
    async fn test_find_by_id_not_found() {
        let repo = setup_repo().await;
        let result = repo.find_by_id(PaymentId::new()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_update_bumps_version_and_persists_milestones() {
        let repo = setup_repo().await;
        let mut payment = repo.create(&card_payment()).await.unwrap();

        payment.assign_gateway_order("ORD-1").unwrap();
        payment.assign_gateway_payment("PAY-1").unwrap();
        payment
            .record_card(
                CardDetails::new("4242", "424242", Some("24".into()), Some("ANA SOUZA".into()))
                    .unwrap(),
            )
            .unwrap();
        payment
            .transition_to(PaymentStatus::Authorized, Utc::now())
            .unwrap();

        let saved = repo.update(&payment).await.unwrap();
        assert_eq!(saved.version(), 1);

        let found = repo.find_by_id(payment.id()).await.unwrap().unwrap();
        assert_eq!(found.version(), 1);
        assert_eq!(found.status(), PaymentStatus::Authorized);
        assert!(found.authorized_at().is_some());
        assert_eq!(found.gateway_order_id(), Some("ORD-1"));
        let card = found.card().unwrap();
        assert_eq!(card.last_four_digits(), "4242");
        assert_eq!(card.cardholder_name.as_deref(), Some("ANA SOUZA"));
    }

    #[tokio::test]
    async fn test_stale_update_is_conflict() {
        let repo = setup_repo().await;
        let payment = repo.create(&card_payment()).await.unwrap();

        let mut first = payment.clone();
        first
            .transition_to(PaymentStatus::Authorized, Utc::now())
            .unwrap();
        repo.update(&first).await.unwrap();

        // Second writer still holds version 0.
        let mut second = payment.clone();
        second
            .transition_to(PaymentStatus::Cancelled, Utc::now())
            .unwrap();
        let result = repo.update(&second).await;
        assert!(matches!(result, Err(RepoError::Conflict(_))));

        let stored = repo.find_by_id(payment.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), PaymentStatus::Authorized);
    }

    #[tokio::test]
    async fn test_update_unknown_payment_is_not_found() {
        let repo = setup_repo().await;
        let result = repo.update(&card_payment()).await;
        assert!(matches!(result, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn test_duplicate_gateway_order_id_is_conflict() {
        let repo = setup_repo().await;

        let mut first = card_payment();
        first.assign_gateway_order("ORD-DUP").unwrap();
        repo.create(&first).await.unwrap();

        let mut second = card_payment();
        second.assign_gateway_order("ORD-DUP").unwrap();
        let result = repo.create(&second).await;
        assert!(matches!(result, Err(RepoError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_find_by_gateway_ids() {
        let repo = setup_repo().await;
        let mut payment = card_payment();
        payment.assign_gateway_order("ORD-7").unwrap();
        payment.assign_gateway_payment("PAY-7").unwrap();
        repo.create(&payment).await.unwrap();

        let by_payment = repo.find_by_gateway_payment_id("PAY-7").await.unwrap();
        assert_eq!(by_payment.unwrap().id(), payment.id());

        let by_order = repo.find_by_gateway_order_id("ORD-7").await.unwrap();
        assert_eq!(by_order.unwrap().id(), payment.id());

        assert!(
            repo.find_by_gateway_payment_id("PAY-unknown")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_list_by_client_and_company() {
        let repo = setup_repo().await;
        let client = ClientId::new();
        let company = CompanyId::new();

        let first = new_payment(client, company, PaymentMethod::Pix);
        repo.create(&first).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = new_payment(client, CompanyId::new(), PaymentMethod::CreditCard);
        repo.create(&second).await.unwrap();
        let other = new_payment(ClientId::new(), company, PaymentMethod::Boleto);
        repo.create(&other).await.unwrap();

        let by_client = repo.list_by_client(client).await.unwrap();
        assert_eq!(by_client.len(), 2);
        // Newest first.
        assert_eq!(by_client[0].id(), second.id());
        assert_eq!(by_client[1].id(), first.id());

        let by_company = repo.list_by_company(company).await.unwrap();
        assert_eq!(by_company.len(), 2);
        assert!(by_company.iter().all(|p| p.company_id() == company));
    }

    #[tokio::test]
    async fn test_refund_amount_round_trips_exactly() {
        let repo = setup_repo().await;
        let mut payment = repo.create(&card_payment()).await.unwrap();
        let now = Utc::now();
        payment
            .transition_to(PaymentStatus::Approved, now)
            .unwrap();
        payment.record_refund(dec!(49.99), now).unwrap();
        repo.update(&payment).await.unwrap();

        let found = repo.find_by_id(payment.id()).await.unwrap().unwrap();
        assert_eq!(found.refunded_amount(), dec!(49.99));
        assert_eq!(found.refundable_amount(), dec!(100.01));
        assert_eq!(found.status(), PaymentStatus::Approved);
    }
}
