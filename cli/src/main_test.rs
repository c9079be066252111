use quillpost::UserProfile;

use super::*;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("quillpost").chain(args.iter().copied())).unwrap()
}

fn signed_in(role: Role) -> Session {
    Session::Authenticated {
        access_token: "tok".to_owned(),
        user: UserProfile {
            id: 1,
            username: "ferris".to_owned(),
            role,
            is_banned: false,
            created_at: "2024-01-01T00:00:00Z".to_owned(),
        },
    }
}

#[test]
fn global_flags_parse() {
    let cli = parse(&["--base-url", "http://blog.test/", "--boot-policy", "strict", "whoami"]);
    assert_eq!(cli.base_url.as_deref(), Some("http://blog.test/"));
    assert_eq!(cli.boot_policy, Some(BootPolicy::Strict));
    assert!(matches!(cli.command, Command::Whoami));
}

#[test]
fn post_body_requires_content_or_file() {
    assert!(Cli::try_parse_from(["quillpost", "posts", "create", "--title", "t"]).is_err());
    assert!(
        Cli::try_parse_from(["quillpost", "posts", "create", "--title", "t", "--content", "x", "--file", "a.md"])
            .is_err()
    );
    let cli = parse(&["posts", "update", "7", "--title", "t", "--file", "a.md"]);
    assert_eq!(gate_for(&cli.command), Gate::Route("/editor/7".to_owned()));
}

#[test]
fn admin_role_parses_case_insensitively() {
    let cli = parse(&["admin", "role", "3", "ADMIN"]);
    let Command::Admin(AdminCommand { command: AdminSubcommand::Role { user_id, role } }) = cli.command else {
        panic!("expected admin role command");
    };
    assert_eq!((user_id, role), (3, Role::Admin));
    assert!(Cli::try_parse_from(["quillpost", "admin", "role", "3", "root"]).is_err());
}

#[test]
fn gates_follow_route_table() {
    assert_eq!(gate_for(&parse(&["posts", "list"]).command), Gate::Open);
    assert_eq!(gate_for(&parse(&["like", "4"]).command), Gate::SignedIn);
    assert_eq!(
        gate_for(&parse(&["collections", "mine"]).command),
        Gate::Route("/collections".to_owned())
    );
    assert_eq!(
        gate_for(&parse(&["admin", "users"]).command),
        Gate::Route("/admin/users".to_owned())
    );
}

#[test]
fn enforce_reports_redirect_and_forbidden() {
    let admin_gate = Gate::Route("/admin/users".to_owned());
    assert!(matches!(
        enforce(&Session::Anonymous, &admin_gate),
        Err(CliError::SignInRequired { from: None })
    ));
    assert!(matches!(enforce(&signed_in(Role::User), &admin_gate), Err(CliError::Forbidden)));
    assert!(enforce(&signed_in(Role::Admin), &admin_gate).is_ok());

    let editor_gate = Gate::Route("/editor/new".to_owned());
    let Err(CliError::SignInRequired { from }) = enforce(&Session::Anonymous, &editor_gate) else {
        panic!("expected sign-in redirect");
    };
    assert_eq!(from.as_deref(), Some("/editor/new"));
}

#[test]
fn api_errors_render_status_and_request_id() {
    let mut err = ApiError::new(403, "USER_BANNED", "account banned");
    err.request_id = Some("req-9".to_owned());
    let rendered = CliError::from(err).to_json();
    assert_eq!(rendered["code"], "USER_BANNED");
    assert_eq!(rendered["status"], 403);
    assert_eq!(rendered["requestId"], "req-9");
    assert_eq!(rendered["message"], "account banned");
}

#[test]
fn route_decision_includes_post_login_target() {
    let rendered = decision_json("/collections", &GuardDecision::RedirectToLogin { from: Some("/collections".to_owned()) });
    assert_eq!(rendered["decision"], "redirect");
    assert_eq!(rendered["afterLogin"], "/collections");
}

#[tokio::test]
async fn background_refresh_outcome_is_reported() {
    assert_eq!(join_background(None).await, None);
    assert_eq!(join_background(Some(tokio::spawn(async { true }))).await, Some(true));
}

async fn panicking_refresh() -> bool {
    panic!("refresh task blew up")
}

#[tokio::test]
async fn panicked_background_refresh_is_not_fatal() {
    let background = tokio::spawn(panicking_refresh());
    assert_eq!(join_background(Some(background)).await, None);
}
