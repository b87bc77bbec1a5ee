//! Transcripts shaped like real tool output.

/// A minimal successful plan adding one resource.
pub const PLAN_ONE_ADD: &str = "Plan: 1 to add, 0 to change, 0 to destroy.\n";

/// A colorized Terraform plan with setup noise and an outputs section.
pub const TERRAFORM_PLAN: &str = "\x1b[0m\x1b[1mInitializing the backend...\x1b[0m\r
\x1b[0m\x1b[32mTerraform has been successfully initialized!\x1b[0m\r
\r
aws_s3_bucket.logs: Refreshing state... [id=acme-logs]\r
\r
Terraform used the selected providers to generate the following execution\r
plan. Resource actions are indicated with the following symbols:\r
  \x1b[32m+\x1b[0m create\r
  \x1b[33m~\x1b[0m update in-place\r
\r
Terraform will perform the following actions:\r
\r
\x1b[1m  # aws_s3_bucket.assets\x1b[0m will be created\r
\x1b[0m  \x1b[32m+\x1b[0m\x1b[0m resource \"aws_s3_bucket\" \"assets\" {\r
      \x1b[32m+\x1b[0m\x1b[0m bucket = \"acme-assets\"\r
    }\r
\r
\x1b[1m  # aws_s3_bucket.logs\x1b[0m will be updated in-place\r
\x1b[0m  \x1b[33m~\x1b[0m\x1b[0m resource \"aws_s3_bucket\" \"logs\" {\r
      \x1b[33m~\x1b[0m\x1b[0m tags = {}\r
    }\r
\r
\x1b[1mPlan:\x1b[0m 1 to add, 1 to change, 0 to destroy.\r
\r
Changes to Outputs:\r
  \x1b[32m+\x1b[0m\x1b[0m assets_bucket = \"acme-assets\"\r
\r
Releasing state lock. This may take a few moments...\r
";

/// An OpenTofu plan whose summary carries a replace count.
pub const OPENTOFU_PLAN: &str = "OpenTofu used the selected providers to generate the following execution plan.

OpenTofu will perform the following actions:

  # aws_instance.web must be replaced
-/+ resource \"aws_instance\" \"web\" {
      ~ ami = \"ami-1\" -> \"ami-2\" # forces replacement
    }

Plan: 0 to add, 0 to change, 0 to destroy, 1 to replace.
";

/// A `run --all` transcript for units `a` and `b` under `live`.
pub const RUN_ALL_TRANSCRIPT: &str = "\x1b[2m10:01:02.000\x1b[0m \x1b[34mINFO\x1b[0m   The runner-pool runner at . will be processed
[a] Initializing the backend...
[a] Terraform will perform the following actions:
[a]   # null_resource.a will be created
[a] Plan: 1 to add, 0 to change, 0 to destroy.
[b] Initializing the backend...
[b] No changes. Your infrastructure matches the configuration.

\u{276F}\u{276F} Run Summary  2 units  4s
   \u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}
   Succeeded    2
";
