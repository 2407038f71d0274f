//! End-to-end scenarios over the service layer
//!
//! The in-memory scenarios always run. Those marked `postgres` need
//! `DATABASE_URL` and `REDIS_URL` and are skipped otherwise.

use anyhow::Result;
use integration_tests::*;
use social_core::{ContentType, MediaType, Snowflake};
use social_service::dto::{
    ChangeEmailRequest, PasswordResetRequest, RequestStatus, SearchContentRequest,
    UpdateContentRequest,
};
use social_service::{
    AccountService, CommentService, ConnectionService, ContentService, DiscoveryService,
    HashtagLinker, LikeService, UserService,
};

// ============================================================================
// Connection state machine
// ============================================================================

#[tokio::test]
async fn test_crossing_requests_share_one_row() -> Result<()> {
    let app = TestApp::in_memory();
    let alice = app.private_user("alice").await?;
    let bob = app.private_user("bob").await?;
    let service = ConnectionService::new(&app.ctx);

    let first = service.request_connection(alice, bob).await?;
    assert_eq!(first.status, RequestStatus::Pending);

    let second = service.request_connection(bob, alice).await?;
    assert_eq!(second.status, RequestStatus::Ok);
    assert_eq!(second.connection.requester_id, alice.to_string());
    assert!(second.connection.accepted);

    assert_eq!(app.connection_rows(), Some(1));
    assert!(app.ctx.connection_repo().is_connected(bob, alice).await?);
    Ok(())
}

#[tokio::test]
async fn test_self_connection_is_rejected() -> Result<()> {
    let app = TestApp::in_memory();
    let alice = app.user("alice").await?;

    let err = ConnectionService::new(&app.ctx)
        .request_connection(alice, alice)
        .await
        .unwrap_err();
    assert_service_error(&err, 400, Some("cannot_connect_to_self"))?;
    assert_eq!(app.connection_rows(), Some(0));
    Ok(())
}

#[tokio::test]
async fn test_public_receiver_accepts_immediately() -> Result<()> {
    let app = TestApp::in_memory();
    let alice = app.user("alice").await?;
    let bob = app.user("bob").await?;
    let service = ConnectionService::new(&app.ctx);

    let response = service.request_connection(alice, bob).await?;
    assert!(response.is_immediate());
    assert_eq!(serde_json::to_value(&response)?["status"], "ok");

    assert!(app.ctx.connection_repo().pending_for(bob).await?.is_empty());
    assert!(app.ctx.connection_repo().sent_by(alice).await?.is_empty());
    assert_eq!(service.count_connections(bob).await?, 1);

    let err = service.request_connection(alice, bob).await.unwrap_err();
    assert_service_error(&err, 409, Some("already_connected"))?;
    let err = service.request_connection(bob, alice).await.unwrap_err();
    assert_service_error(&err, 409, Some("already_connected"))?;
    Ok(())
}

#[tokio::test]
async fn test_private_receiver_accepts_once() -> Result<()> {
    let app = TestApp::in_memory();
    let alice = app.user("alice").await?;
    let bob = app.private_user("bob").await?;
    let service = ConnectionService::new(&app.ctx);

    let response = service.request_connection(alice, bob).await?;
    assert_eq!(serde_json::to_value(&response)?["status"], "pending");

    let err = service.request_connection(alice, bob).await.unwrap_err();
    assert_service_error(&err, 409, Some("request_already_exists"))?;

    let received = service.list_received(bob).await?;
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].id, alice.to_string());

    // wrong direction
    assert!(!service.accept_connection(bob, alice).await?);
    assert!(service.accept_connection(alice, bob).await?);
    assert!(!service.accept_connection(alice, bob).await?);
    assert!(service.list_received(bob).await?.is_empty());
    assert!(app.ctx.connection_repo().is_connected(alice, bob).await?);
    Ok(())
}

#[tokio::test]
async fn test_reject_and_remove() -> Result<()> {
    let app = TestApp::in_memory();
    let alice = app.user("alice").await?;
    let bob = app.private_user("bob").await?;
    let service = ConnectionService::new(&app.ctx);

    assert!(!service.reject_connection(alice, bob).await?);
    service.request_connection(alice, bob).await?;
    assert!(!service.reject_connection(bob, alice).await?);
    assert!(service.reject_connection(alice, bob).await?);
    assert_eq!(app.connection_rows(), Some(0));

    app.connect(alice, bob).await?;
    // accept/reject only touch pending edges
    assert!(!service.reject_connection(alice, bob).await?);
    assert!(service.remove_connection(bob, alice).await?);
    assert!(!app.ctx.connection_repo().is_connected(alice, bob).await?);
    assert!(app.ctx.connection_repo().edge_between(alice, bob).await?.is_none());
    assert!(!service.remove_connection(alice, bob).await?);
    Ok(())
}

#[tokio::test]
async fn test_username_wrappers() -> Result<()> {
    let app = TestApp::in_memory();
    let alice = app.user("alice").await?;
    let bob = app.private_user("bob").await?;
    let alice_name = app.username(alice).await?;
    let bob_name = app.username(bob).await?;
    let service = ConnectionService::new(&app.ctx);

    service.request_by_username(alice, &bob_name).await?;
    assert_eq!(service.list_sent(alice).await?[0].username, bob_name);
    assert!(service.accept_from(bob, &alice_name).await?);
    assert!(service.remove_by_username(alice, &bob_name).await?);

    let err = service
        .request_by_username(alice, "nobody_at_all")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.reason(), None);
    Ok(())
}

#[tokio::test]
async fn test_private_connections_are_hidden_from_strangers() -> Result<()> {
    let app = TestApp::in_memory();
    let hidden = app.private_user("hidden").await?;
    let friend = app.user("friend").await?;
    let stranger = app.user("stranger").await?;
    let hidden_name = app.username(hidden).await?;
    app.connect(friend, hidden).await?;

    let service = ConnectionService::new(&app.ctx);
    let err = service
        .list_connections(stranger, &hidden_name)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 403);

    assert_eq!(service.list_connections(friend, &hidden_name).await?.len(), 1);
    assert_eq!(service.list_connections(hidden, &hidden_name).await?.len(), 1);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_symmetric_requests_leave_one_edge() -> Result<()> {
    let app = TestApp::in_memory();

    for round in 0..25 {
        let a = app.private_user("racer_a").await?;
        let b = app.private_user("racer_b").await?;

        let forward = {
            let ctx = app.ctx.clone();
            tokio::spawn(async move { ConnectionService::new(&ctx).request_connection(a, b).await })
        };
        let backward = {
            let ctx = app.ctx.clone();
            tokio::spawn(async move { ConnectionService::new(&ctx).request_connection(b, a).await })
        };

        let results = [forward.await?, backward.await?];
        let immediate = results
            .iter()
            .filter(|result| result.as_ref().is_ok_and(|r| r.is_immediate()))
            .count();
        assert!(results.iter().all(Result::is_ok), "round {round}: {results:?}");
        assert_eq!(immediate, 1, "round {round}");

        let edge = app
            .ctx
            .connection_repo()
            .edge_between(a, b)
            .await?
            .expect("edge exists");
        assert!(edge.accepted);
        assert_eq!(app.connection_rows(), Some(round + 1));
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_to_public_user() -> Result<()> {
    let app = TestApp::in_memory();
    let a = app.user("open_a").await?;
    let b = app.user("open_b").await?;

    let mut handles = Vec::new();
    for (from, to) in [(a, b), (b, a), (a, b), (b, a)] {
        let ctx = app.ctx.clone();
        handles.push(tokio::spawn(async move {
            ConnectionService::new(&ctx).request_connection(from, to).await
        }));
    }

    let mut accepted = 0;
    for handle in handles {
        match handle.await? {
            Ok(response) => {
                assert!(response.is_immediate());
                accepted += 1;
            }
            Err(err) => assert_eq!(err.status_code(), 409),
        }
    }
    assert_eq!(accepted, 1);
    assert_eq!(app.connection_rows(), Some(1));
    Ok(())
}

// ============================================================================
// Content and hashtags
// ============================================================================

#[tokio::test]
async fn test_hashtag_lifecycle_through_content() -> Result<()> {
    let app = TestApp::in_memory();
    let alice = app.user("alice").await?;
    let service = ContentService::new(&app.ctx);
    let linker = HashtagLinker::new(&app.ctx);

    let first = app.post(alice, "#sunset at the #beach").await?;
    let second = app.post(alice, "another #beach").await?;
    assert_eq!(linker.contents_by_hashtag("beach", None).await?.len(), 2);

    service
        .update_description(
            alice,
            first,
            UpdateContentRequest {
                description: "just #clouds".to_string(),
            },
        )
        .await?;
    assert!(app.ctx.hashtag_repo().find_by_name("sunset").await?.is_none());
    let beach = linker.contents_by_hashtag("beach", None).await?;
    assert_eq!(beach.len(), 1);
    assert_eq!(beach[0].id, second.to_string());

    // restoring the description restores the original association set
    let restored = service
        .update_description(
            alice,
            first,
            UpdateContentRequest {
                description: "#sunset at the #beach".to_string(),
            },
        )
        .await?;
    let mut tags = restored.hashtags.clone();
    tags.sort();
    assert_eq!(tags, vec!["beach", "sunset"]);
    assert!(app.ctx.hashtag_repo().find_by_name("clouds").await?.is_none());

    service.delete_content(alice, first).await?;
    service.delete_content(alice, second).await?;
    for tag in ["sunset", "beach"] {
        assert!(app.ctx.hashtag_repo().find_by_name(tag).await?.is_none());
        assert!(linker.contents_by_hashtag(tag, None).await.is_err());
    }
    Ok(())
}

#[tokio::test]
async fn test_media_listing_and_search() -> Result<()> {
    let app = TestApp::in_memory();
    let alice = app.user("alice").await?;
    let alice_name = app.username(alice).await?;
    let service = ContentService::new(&app.ctx);

    app.post(alice, "Plain words").await?;
    let clip = service
        .create_media(alice, media_request("Concert #Live", MediaType::Video))
        .await?;
    assert_eq!(clip.content_type, ContentType::Media);

    let media = service
        .list_by_owner(&alice_name, Some(ContentType::Media))
        .await?;
    assert_eq!(media.len(), 1);
    assert_eq!(service.list_by_owner(&alice_name, None).await?.len(), 2);

    let found = service
        .search(SearchContentRequest {
            hashtag: Some("#live".to_string()),
            ..Default::default()
        })
        .await?;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, clip.id);

    let found = service
        .search(SearchContentRequest {
            query: Some("PLAIN".to_string()),
            content_type: Some(ContentType::Post),
            ..Default::default()
        })
        .await?;
    assert_eq!(found.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_likes_are_idempotent() -> Result<()> {
    let app = TestApp::in_memory();
    let alice = app.user("alice").await?;
    let bob = app.user("bob").await?;
    let post = app.post(alice, "like me").await?;
    let likes = LikeService::new(&app.ctx);

    assert!(likes.like(bob, post).await?);
    assert!(!likes.like(bob, post).await?);
    assert_eq!(ContentService::new(&app.ctx).get_content(post).await?.like_count, 1);

    assert!(!likes.toggle_like(bob, post).await?);
    assert_eq!(ContentService::new(&app.ctx).get_content(post).await?.like_count, 0);

    let err = likes.like(bob, Snowflake::new(1)).await.unwrap_err();
    assert!(err.is_not_found());
    Ok(())
}

#[tokio::test]
async fn test_comment_threads() -> Result<()> {
    let app = TestApp::in_memory();
    let alice = app.user("alice").await?;
    let bob = app.user("bob").await?;
    let post = app.post(alice, "discuss").await?;
    let comments = CommentService::new(&app.ctx);

    let top = comments
        .create_comment(bob, post, comment_request("first!", None))
        .await?;
    let top_id = Snowflake::parse(&top.id)?;
    let reply = comments
        .create_comment(alice, post, comment_request("thanks", Some(top_id)))
        .await?;
    let nested = comments
        .create_comment(
            bob,
            post,
            comment_request("welcome", Some(Snowflake::parse(&reply.id)?)),
        )
        .await?;
    assert_eq!(nested.reply_to.as_deref(), Some(top.id.as_str()));

    assert!(comments.toggle_comment_like(alice, top_id).await?);
    let listed = comments.list_comments(post).await?;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].reply_count, 2);
    assert_eq!(listed[0].like_count, 1);

    assert_eq!(comments.delete_comment(alice, top_id).await.unwrap_err().status_code(), 403);
    assert!(comments.delete_comment(bob, top_id).await?);
    assert!(comments.list_comments(post).await?.is_empty());
    Ok(())
}

// ============================================================================
// Discovery
// ============================================================================

#[tokio::test]
async fn test_explore_ranks_peer_liked_content_first() -> Result<()> {
    let app = TestApp::in_memory();
    let viewer = app.user("viewer").await?;
    let peer = app.user("peer").await?;
    let stranger = app.user("stranger").await?;
    let owner = app.user("owner").await?;
    app.connect(viewer, peer).await?;

    let plain = app.post(owner, "same text").await?;
    let social = app.post(owner, "same text").await?;
    app.like(stranger, plain).await?;
    app.like(peer, social).await?;

    let feed = DiscoveryService::new(&app.ctx).explore(viewer, Some(10)).await?;
    assert_eq!(feed.len(), 2);
    assert_eq!(feed[0].id, social.to_string());

    let social_score = feed[0].score.unwrap_or_default();
    let plain_score = feed[1].score.unwrap_or_default();
    assert!(social_score - plain_score >= 10);
    Ok(())
}

#[tokio::test]
async fn test_feeds_follow_connections_and_interests() -> Result<()> {
    let app = TestApp::in_memory();
    let viewer = app.user("viewer").await?;
    let peer = app.user("peer").await?;
    let other = app.user("other").await?;
    app.connect(viewer, peer).await?;

    let peer_post = app.post(peer, "#travel notes").await?;
    let other_post = app.post(other, "#travel photos").await?;
    app.like(viewer, peer_post).await?;

    let discovery = DiscoveryService::new(&app.ctx);

    let recommended = discovery.recommend(viewer, None).await?;
    assert_eq!(recommended.len(), 1);
    assert_eq!(recommended[0].id, peer_post.to_string());

    let related = discovery.related(viewer, None).await?;
    assert_eq!(related.len(), 1);
    assert_eq!(related[0].id, other_post.to_string());

    let trending = discovery.trending(None).await?;
    assert_eq!(trending[0].id, peer_post.to_string());

    // private owners drop out of explore
    UserService::new(&app.ctx).set_private(other, true).await?;
    assert!(discovery.explore(viewer, None).await?.is_empty());
    Ok(())
}

// ============================================================================
// Accounts
// ============================================================================

#[tokio::test]
async fn test_password_reset_by_mail() -> Result<()> {
    let outbox = MailOutbox::new();
    let app = TestApp::with_outbox(outbox.clone())?;
    let accounts = AccountService::new(&app.ctx);

    let request = register_request("reset");
    let username = request.username.clone();
    let email = request.email.clone().unwrap_or_default();
    accounts.register(request).await?;

    accounts.send_password_reset_code(&username).await?;
    let mail = outbox.last().expect("reset mail");
    assert_eq!(mail.to, email);
    let code = outbox.last_code().expect("code in body");
    assert_eq!(code.len(), 6);

    let reset = |code: &str| PasswordResetRequest {
        email: email.clone(),
        code: code.to_string(),
        new_password: "BrandNew456".to_string(),
    };
    let wrong = if code == "000000" { "111111" } else { "000000" };
    assert!(!accounts.reset_password_with_code(reset(wrong)).await?);
    assert!(accounts.reset_password_with_code(reset(&code)).await?);
    // codes are single use
    assert!(!accounts.reset_password_with_code(reset(&code)).await?);
    Ok(())
}

#[tokio::test]
async fn test_email_change_by_mail() -> Result<()> {
    let outbox = MailOutbox::new();
    let app = TestApp::with_outbox(outbox.clone())?;
    let user = app.user("mover").await?;
    let accounts = AccountService::new(&app.ctx);

    accounts
        .request_email_change(
            user,
            ChangeEmailRequest {
                email: "moved@example.com".to_string(),
            },
        )
        .await?;
    assert_eq!(outbox.last().expect("mail").to, "moved@example.com");
    let code = outbox.last_code().expect("code");

    assert!(!accounts.confirm_email_change(user, "nope").await?);
    assert!(accounts.confirm_email_change(user, &code).await?);
    let current = UserService::new(&app.ctx).get_current_user(user).await?;
    assert_eq!(current.email.as_deref(), Some("moved@example.com"));
    Ok(())
}

#[tokio::test]
async fn test_duplicate_username_conflicts() -> Result<()> {
    let app = TestApp::in_memory();
    let accounts = AccountService::new(&app.ctx);

    let request = register_request("dup");
    accounts.register(request.clone()).await?;
    let err = accounts.register(request).await.unwrap_err();
    assert_eq!(err.status_code(), 409);
    Ok(())
}

// ============================================================================
// PostgreSQL + Redis
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_postgres_concurrent_symmetric_requests() -> Result<()> {
    if !check_test_env() {
        return Ok(());
    }

    let app = TestApp::postgres().await?;
    let a = app.private_user("pg_a").await?;
    let b = app.private_user("pg_b").await?;

    let forward = {
        let ctx = app.ctx.clone();
        tokio::spawn(async move { ConnectionService::new(&ctx).request_connection(a, b).await })
    };
    let backward = {
        let ctx = app.ctx.clone();
        tokio::spawn(async move { ConnectionService::new(&ctx).request_connection(b, a).await })
    };
    forward.await??;
    backward.await??;

    let repo = app.ctx.connection_repo();
    let edge = repo.edge_between(a, b).await?.expect("edge exists");
    assert!(edge.accepted);
    assert!(repo.pending_for(a).await?.is_empty());
    assert!(repo.pending_for(b).await?.is_empty());
    assert_eq!(repo.count_peers(a).await?, 1);
    Ok(())
}

#[tokio::test]
async fn test_postgres_password_reset_code_in_redis() -> Result<()> {
    if !check_test_env() {
        return Ok(());
    }

    let app = TestApp::postgres().await?;
    let accounts = AccountService::new(&app.ctx);
    let request = register_request("pgreset");
    let username = request.username.clone();
    accounts.register(request).await?;

    accounts.send_password_reset_code(&username).await?;
    let user = UserService::new(&app.ctx).get_entity_by_username(&username).await?;
    let email = user.email.unwrap_or_default();
    let stored = app
        .ctx
        .code_store()
        .get(&social_service::CodePurpose::ResetPassword.key(&email))
        .await?;
    assert_eq!(stored.map(|code| code.len()), Some(6));
    Ok(())
}
