use jobs_api::models::job::{CreateJobRequest, JobStatus, TicketPayload};
use jobs_api::JobsApi;
use mockito::{Matcher, Server};

fn one_ticket_batch() -> CreateJobRequest {
    CreateJobRequest {
        dates: "20/Aug/25".to_string(),
        jira_instance: "jiradc".to_string(),
        username: "user.name".to_string(),
        tickets: vec![TicketPayload {
            ticket_id: "TIME-147".to_string(),
            time_spend: "8".to_string(),
            description: "Sprint planning".to_string(),
            type_of_work: "Review".to_string(),
        }],
    }
}

#[tokio::test]
async fn create_then_follow_job_to_completion() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = Server::new_async().await;
    let create = server
        .mock("POST", "/jobs")
        .match_header("authorization", "Bearer pat-123")
        .with_status(200)
        .with_body(r#"{"data": {"jobId": "42", "total": 1, "message": "Job queued"}}"#)
        .create_async()
        .await;
    let status = server
        .mock("GET", "/jobs/status")
        .match_query(Matcher::UrlEncoded("jobId".into(), "42".into()))
        .with_status(200)
        .with_body(
            r#"{"data": {"jobId": "42", "total": 1, "processed": 1, "failed": 0,
                "status": "completed", "progress": 100, "errors": []}}"#,
        )
        .create_async()
        .await;

    let api = JobsApi::builder().base_url(server.url()).timeout(5).build()?;
    let created = api.create_job("pat-123", &one_ticket_batch()).await?;
    let report = api.job_status(&created.job_id).await?;

    assert_eq!(report.job_id, "42");
    assert_eq!(report.status, JobStatus::Completed);
    assert!((report.progress - 100.0).abs() < f64::EPSILON);
    assert_eq!(report.errors, Some(vec![]));
    create.assert_async().await;
    status.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn unknown_job_reports_backend_message() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = Server::new_async().await;
    let _status = server
        .mock("GET", "/jobs/status")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body(r#"{"message": "Job not found"}"#)
        .create_async()
        .await;

    let api = JobsApi::new(server.url())?;
    let err = api.job_status("missing").await.expect_err("Expected 404");

    assert_eq!(err.status_code().map(|c| c.as_u16()), Some(404));
    assert_eq!(err.user_message("Error fetching job status. Please try again."), "Job not found");
    Ok(())
}
