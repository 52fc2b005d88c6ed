mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use uuid::Uuid;

use common::TestApp;

#[tokio::test]
async fn creator_attaches_and_detaches_members() -> Result<()> {
    let app = TestApp::new();
    let creator = app.register("creator").await?;
    let member = app.register("member").await?;
    let project_id = app.create_project(&creator, "Launch").await?;

    let attached = app.attach(&creator, &project_id, &member).await?;
    assert_eq!(attached.status, StatusCode::OK);
    assert_eq!(attached.body["message"], "Member attached successfully.");
    assert_eq!(app.member_ids(&creator, &project_id).await?, vec![member.id.clone()]);

    let detached = app.detach(&creator, &project_id, &member).await?;
    assert_eq!(detached.status, StatusCode::OK);
    assert_eq!(detached.body["message"], "Member detached successfully.");
    assert!(app.member_ids(&creator, &project_id).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn attaching_twice_lists_the_member_once() -> Result<()> {
    let app = TestApp::new();
    let creator = app.register("creator").await?;
    let member = app.register("member").await?;
    let project_id = app.create_project(&creator, "Launch").await?;

    assert_eq!(app.attach(&creator, &project_id, &member).await?.status, StatusCode::OK);
    assert_eq!(app.attach(&creator, &project_id, &member).await?.status, StatusCode::OK);

    assert_eq!(app.member_ids(&creator, &project_id).await?, vec![member.id.clone()]);
    Ok(())
}

#[tokio::test]
async fn detaching_a_non_member_succeeds() -> Result<()> {
    let app = TestApp::new();
    let creator = app.register("creator").await?;
    let stranger = app.register("stranger").await?;
    let project_id = app.create_project(&creator, "Launch").await?;

    let res = app.detach(&creator, &project_id, &stranger).await?;

    assert_eq!(res.status, StatusCode::OK);
    assert!(app.member_ids(&creator, &project_id).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn non_creator_cannot_attach_or_detach() -> Result<()> {
    let app = TestApp::new();
    let creator = app.register("creator").await?;
    let intruder = app.register("intruder").await?;
    let member = app.register("member").await?;
    let project_id = app.create_project(&creator, "Launch").await?;

    let attach = app.attach(&intruder, &project_id, &member).await?;
    assert_eq!(attach.status, StatusCode::FORBIDDEN);
    assert_eq!(attach.body["code"], "FORBIDDEN");
    assert!(app.member_ids(&creator, &project_id).await?.is_empty());

    app.attach(&creator, &project_id, &member).await?;
    let detach = app.detach(&member, &project_id, &member).await?;
    assert_eq!(detach.status, StatusCode::FORBIDDEN);
    assert_eq!(app.member_ids(&creator, &project_id).await?, vec![member.id.clone()]);
    Ok(())
}

#[tokio::test]
async fn members_are_listed_in_attach_order() -> Result<()> {
    let app = TestApp::new();
    let creator = app.register("creator").await?;
    let first = app.register("first").await?;
    let second = app.register("second").await?;
    let project_id = app.create_project(&creator, "Launch").await?;

    app.attach(&creator, &project_id, &second).await?;
    app.attach(&creator, &project_id, &first).await?;
    app.attach(&creator, &project_id, &creator).await?;

    assert_eq!(
        app.member_ids(&creator, &project_id).await?,
        vec![second.id.clone(), first.id.clone(), creator.id.clone()]
    );
    Ok(())
}

#[tokio::test]
async fn unknown_user_or_project_is_not_found() -> Result<()> {
    let app = TestApp::new();
    let creator = app.register("creator").await?;
    let project_id = app.create_project(&creator, "Launch").await?;

    let no_user = app
        .request(
            Method::POST,
            &format!("/projects/{}/members/{}", project_id, Uuid::new_v4()),
            Some(&creator.token),
            None,
        )
        .await?;
    assert_eq!(no_user.status, StatusCode::NOT_FOUND);

    let no_project = app
        .request(
            Method::POST,
            &format!("/projects/{}/members/{}", Uuid::new_v4(), creator.id),
            Some(&creator.token),
            None,
        )
        .await?;
    assert_eq!(no_project.status, StatusCode::NOT_FOUND);
    Ok(())
}
