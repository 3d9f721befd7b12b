use std::collections::HashSet;

use indexmap::IndexMap;

use crate::extractor::model::{
  BootstrapSequence, DependencyEdge, Operation, OperationClass, RootOperationAnalysis,
};

/// Identifier keywords marking setup-style operations.
const SETUP_KEYWORDS: &[&str] = &["setup", "init", "bootstrap", "configure", "provision"];

/// Identity/access bootstrap operations known by convention.
const SETUP_OPERATION_IDS: &[&str] = &[
  "createUser",
  "createGroup",
  "createRole",
  "createTenant",
  "createAuthorization",
  "createMappingRule",
];

/// Hand-curated bootstrap templates, gated on which operations actually
/// exist in the extracted set. This is a configuration table by design; it
/// can move out of code into data without changing the analyzer's contract.
struct SequenceTemplate {
  name: &'static str,
  description: &'static str,
  operations: &'static [&'static str],
  produces: &'static [&'static str],
}

const BOOTSTRAP_TEMPLATES: &[SequenceTemplate] = &[
  SequenceTemplate {
    name: "resource-deployment",
    description: "Deploy process, decision, and form resources",
    operations: &["createDeployment"],
    produces: &["ProcessDefinitionKey", "DecisionDefinitionKey", "FormKey"],
  },
  SequenceTemplate {
    name: "process-instance",
    description: "Deploy resources, then start a process instance",
    operations: &["createDeployment", "createProcessInstance"],
    produces: &["ProcessInstanceKey"],
  },
  SequenceTemplate {
    name: "process-instance-search",
    description: "Deploy resources, start a process instance, then locate it",
    operations: &["createDeployment", "createProcessInstance", "searchProcessInstances"],
    produces: &["ProcessInstanceKey"],
  },
  SequenceTemplate {
    name: "identity-bootstrap",
    description: "Provision an initial user for access-controlled operations",
    operations: &["createUser"],
    produces: &["UserKey"],
  },
  SequenceTemplate {
    name: "tenant-bootstrap",
    description: "Provision a tenant before tenant-scoped operations",
    operations: &["createTenant"],
    produces: &["TenantKey"],
  },
];

/// Classifies deployment/setup operations and assembles the bootstrap
/// sequences required to exercise dependent operations.
///
/// Entry points are recomputed locally from the edge list on purpose; this
/// analyzer must not depend on the analytics pass having run.
pub fn analyze(operations: &IndexMap<String, Operation>, edges: &[DependencyEdge]) -> RootOperationAnalysis {
  let deployment_operations: Vec<String> = operations
    .values()
    .filter(|op| is_deployment_operation(op))
    .map(|op| op.id.clone())
    .collect();

  let setup_operations: Vec<String> = operations
    .values()
    .filter(|op| is_setup_operation(op))
    .map(|op| op.id.clone())
    .collect();

  let targets: HashSet<&str> = edges.iter().map(|e| e.target.as_str()).collect();
  let entry_points: Vec<String> = operations
    .keys()
    .filter(|id| !targets.contains(id.as_str()))
    .cloned()
    .collect();

  let bootstrap_sequences = BOOTSTRAP_TEMPLATES
    .iter()
    .filter(|template| template.operations.iter().all(|id| operations.contains_key(*id)))
    .map(|template| BootstrapSequence {
      name: template.name.to_string(),
      description: template.description.to_string(),
      operations: template.operations.iter().map(|id| (*id).to_string()).collect(),
      produces: template.produces.iter().map(|name| (*name).to_string()).collect(),
    })
    .collect();

  RootOperationAnalysis {
    deployment_operations,
    setup_operations,
    entry_points,
    bootstrap_sequences,
  }
}

fn is_deployment_operation(operation: &Operation) -> bool {
  if operation.classification == OperationClass::Deploy {
    return true;
  }

  let id_lower = operation.id.to_lowercase();
  if id_lower.contains("deploy") || operation.path.to_lowercase().contains("deploy") {
    return true;
  }

  // A create against a top-level collection bootstraps a resource family.
  operation.classification == OperationClass::Create && is_top_level_path(&operation.path)
}

fn is_setup_operation(operation: &Operation) -> bool {
  let id_lower = operation.id.to_lowercase();
  SETUP_KEYWORDS.iter().any(|keyword| id_lower.contains(keyword))
    || SETUP_OPERATION_IDS.contains(&operation.id.as_str())
}

fn is_top_level_path(path: &str) -> bool {
  path.split('/').filter(|segment| !segment.is_empty()).count() == 1
}
