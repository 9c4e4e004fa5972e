//! GraphQL documents for the three data-fetch operations.
//!
//! Each fetches the latest 100 items.

pub const GET_REPO_ISSUES: &str = r#"
query GetRepoIssues($owner: String!, $name: String!, $states: [IssueState!]) {
  repository(owner: $owner, name: $name) {
    issues(first: 100, states: $states, orderBy: {field: CREATED_AT, direction: DESC}) {
      edges {
        node {
          title
          url
          state
          stateReason
          createdAt
          updatedAt
          comments { totalCount }
          labels(first: 20) { edges { node { name } } }
        }
      }
    }
  }
}
"#;

pub const GET_REPO_COMMITS: &str = r#"
query GetRepoCommits($owner: String!, $name: String!) {
  repository(owner: $owner, name: $name) {
    defaultBranchRef {
      target {
        __typename
        ... on Commit {
          history(first: 100) {
            edges {
              node {
                committedDate
                authoredDate
                author { name }
                message
                changedFilesIfAvailable
                additions
                deletions
                status { state }
              }
            }
          }
        }
      }
    }
  }
}
"#;

pub const GET_REPO_PULL_REQUESTS: &str = r#"
query GetRepoPullRequests($owner: String!, $name: String!, $states: [PullRequestState!]) {
  repository(owner: $owner, name: $name) {
    pullRequests(first: 100, states: $states, orderBy: {field: CREATED_AT, direction: DESC}) {
      nodes {
        url
        mergedAt
        title
        createdAt
        updatedAt
        additions
        deletions
        commits { totalCount }
        reviews { totalCount }
        comments { totalCount }
        state
        labels(first: 20) { edges { node { name } } }
      }
    }
  }
}
"#;
