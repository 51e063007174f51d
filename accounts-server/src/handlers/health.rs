use crate::repo::Repo;
use axum::http::StatusCode;

#[tracing::instrument]
pub async fn handler(Repo(repo): Repo) -> (StatusCode, &'static str) {
    match repo.ping().await {
        Ok(()) => (StatusCode::OK, "OK"),
        Err(err) => {
            tracing::error!(?err, "account store is unreachable");
            (StatusCode::SERVICE_UNAVAILABLE, "account store is unreachable")
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::repo::MemoryRepository;
    use std::sync::Arc;

    #[test_log::test(tokio::test)]
    async fn test_success() {
        let repo = Repo(Arc::new(MemoryRepository::default()));

        assert_eq!(handler(repo).await, (StatusCode::OK, "OK"));
    }
}
