mod common;

use atlas_swap::app::ActiveScreen;
use atlas_swap::context::BLOCKED_NOTICE;
use atlas_swap::entity::{AccountStatus, IdentityPatch, TransactionStatus, ViewId};
use atlas_swap::supabase::{AuthService, ProfileRepository};
use atlas_swap::Router;
use common::Harness;

#[tokio::test]
async fn starts_signed_out() {
    let mut harness = Harness::start().await;
    assert!(matches!(harness.app.screen(), ActiveScreen::SignedOut(_)));

    harness.run("go statement").await;
    assert!(harness.saw("Sign in first"));
}

#[tokio::test]
async fn client_login_shows_dashboard_and_own_statement() {
    let mut harness = Harness::start().await;
    harness.run("login client@atlas.local client123").await;

    assert!(matches!(harness.app.screen(), ActiveScreen::Dashboard(_)));
    assert!(harness.saw("Welcome back, Ana!"));

    harness.run("go statement").await;
    assert!(harness.saw("TX-10482"));
    assert!(harness.saw("TX-55310"));

    harness.run("search 10482").await;
    assert!(harness.saw("TX-10482"));
    assert!(!harness.saw("TX-55310"));
}

#[tokio::test]
async fn client_is_redirected_from_admin_sections() {
    let mut harness = Harness::start().await;
    harness.run("login client@atlas.local client123").await;

    harness.run("go customers").await;
    assert_eq!(harness.app.router().current_view(), ViewId::Dashboard);
    assert!(matches!(harness.app.screen(), ActiveScreen::Dashboard(_)));
    assert!(!harness.saw("== Customers =="));
}

#[tokio::test]
async fn client_submits_a_swap() {
    let mut harness = Harness::start().await;
    harness.run("login client@atlas.local client123").await;
    harness.run("go new-transaction").await;

    // Wait for the first quote
    for _ in 0..100 {
        if let ActiveScreen::NewTransaction(swap) = harness.app.screen() {
            if !swap.form().snapshot.loading {
                break;
            }
        }
        tokio::task::yield_now().await;
    }

    let before = harness.backend.transaction_count();
    harness.run("amount 100").await;
    harness
        .run("wallet 0x52908400098527886E0F7030069857D2E4169EE7")
        .await;
    harness.run("submit").await;

    assert!(harness.saw("== Swap requested =="));
    assert_eq!(harness.backend.transaction_count(), before + 1);

    let ActiveScreen::NewTransaction(swap) = harness.app.screen() else {
        panic!("swap screen should stay mounted");
    };
    let id = swap.form().success.clone().unwrap();
    let stored = harness.backend.transaction(&id).unwrap();
    assert_eq!(stored.status, TransactionStatus::Pending);
}

#[tokio::test]
async fn invalid_wallet_is_refused() {
    let mut harness = Harness::start().await;
    harness.run("login client@atlas.local client123").await;
    harness.run("go new-transaction").await;

    let before = harness.backend.transaction_count();
    harness.run("amount 100").await;
    harness.run("wallet 0x123").await;
    assert!(harness.saw("Invalid Polygon address"));

    harness.run("submit").await;
    assert_eq!(harness.backend.transaction_count(), before);
}

#[tokio::test]
async fn profile_save_refreshes_identity() {
    let mut harness = Harness::start().await;
    harness.run("login client@atlas.local client123").await;
    harness.run("go profile").await;

    harness.run("set name Ana Lima").await;
    harness.run("save").await;

    assert!(harness.saw("Profile updated."));
    let identity = harness.app.session().context().identity().cloned().unwrap();
    assert_eq!(identity.full_name.as_deref(), Some("Ana Lima"));
}

#[tokio::test]
async fn blocked_account_is_signed_out_with_notice() {
    let mut harness = Harness::start().await;
    harness.run("login client@atlas.local client123").await;
    let id = harness.app.session().context().user_id().unwrap();

    harness
        .backend
        .update_identity(
            id,
            &IdentityPatch {
                status: Some(AccountStatus::Blocked),
                ..IdentityPatch::default()
            },
        )
        .await
        .unwrap();

    // The next identity fetch notices the block
    harness.run("go profile").await;
    harness.run("save").await;

    assert!(!harness.app.session().context().is_authenticated());
    assert!(matches!(harness.app.screen(), ActiveScreen::SignedOut(_)));
    assert!(harness.saw(BLOCKED_NOTICE));
}

#[tokio::test]
async fn failed_profile_fetch_leaves_no_session_behind() {
    let mut harness = Harness::start().await;
    harness.backend.fail_reads(true);

    harness.run("login client@atlas.local client123").await;
    harness.backend.fail_reads(false);

    assert!(!harness.app.session().context().is_authenticated());
    assert!(matches!(harness.app.screen(), ActiveScreen::SignedOut(_)));
    assert_eq!(harness.backend.current_session().await.unwrap(), None);
}

#[tokio::test]
async fn logout_returns_to_login() {
    let mut harness = Harness::start().await;
    harness.run("login client@atlas.local client123").await;
    harness.run("go statement").await;

    harness.run("logout").await;
    assert!(matches!(harness.app.screen(), ActiveScreen::SignedOut(_)));
    assert_eq!(harness.app.router().current_view(), ViewId::Dashboard);
    assert!(harness.saw("login <email> <password>"));
}

#[tokio::test]
async fn unknown_command_prints_help() {
    let mut harness = Harness::start().await;
    assert!(harness.run("dance").await);
    assert!(harness.saw("Unknown command"));
    assert!(harness.saw("show this help"));

    assert!(!harness.run("quit").await);
}
