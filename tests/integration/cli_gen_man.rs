use test_support::cmd;

#[test]
fn cli_generates_man_page() {
  let (mut c, _cwd) = cmd();
  let out = c.args(["--gen-man"]).output().unwrap();
  assert!(out.status.success());
  let s = String::from_utf8_lossy(&out.stdout);
  // clap_mangen emits a roff manpage starting with .TH and mentions the binary name
  assert!(s.contains(".TH"));
  assert!(s.contains("merge-champ"));
  assert!(s.contains("weighted"));
}
